//! Push channel to the external display client (Server-Sent Events)

pub mod broadcaster;
pub mod events;

pub use broadcaster::SseBroadcaster;
pub use events::SseEvent;

use kjc_common::ClientEvent;

/// Outbound side of the push channel
///
/// Publishing never blocks and never fails: a client that is not
/// connected simply misses the event, the same as a dropped socket.
pub trait ClientPush: Send + Sync {
    fn publish(&self, event: ClientEvent);
}
