//! Start trigger for both playback sides
//!
//! A single signed offset says which side is ahead:
//! - `offset_ms >= 0`: the display client is told to start first, the
//!   master engine resumes `offset_ms` later.
//! - `offset_ms < 0`: the master engine resumes first, the display client
//!   is told to start `|offset_ms|` later.

use super::rendezvous::ReadinessBarrier;
use crate::engine::{EngineCommand, EngineControl};
use crate::error::{Error, Result};
use crate::sse::ClientPush;
use crate::state::SharedState;
use kjc_common::ClientEvent;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Fires the two "go" signals in offset order
pub struct SyncTrigger {
    master: Arc<dyn EngineControl>,
    push: Arc<dyn ClientPush>,
    state: Arc<SharedState>,
    barrier: Arc<ReadinessBarrier>,
}

impl SyncTrigger {
    pub fn new(
        master: Arc<dyn EngineControl>,
        push: Arc<dyn ClientPush>,
        state: Arc<SharedState>,
        barrier: Arc<ReadinessBarrier>,
    ) -> Self {
        Self {
            master,
            push,
            state,
            barrier,
        }
    }

    /// Send both start signals for `asset_id`, ordered and spaced by `offset_ms`
    ///
    /// The second signal is only sent if `session_id` is still current after
    /// the offset delay; otherwise the newer session owns the engines and
    /// [`Error::Superseded`] is returned.
    pub async fn fire(&self, session_id: u64, asset_id: &str, offset_ms: i64) -> Result<()> {
        let delay = Duration::from_millis(offset_ms.unsigned_abs());

        if offset_ms >= 0 {
            self.push.publish(ClientEvent::start_now(asset_id));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.ensure_current(session_id).await?;
            self.master.send(EngineCommand::Resume).await?;
        } else {
            self.master.send(EngineCommand::Resume).await?;
            tokio::time::sleep(delay).await;
            self.ensure_current(session_id).await?;
            self.push.publish(ClientEvent::start_now(asset_id));
        }

        info!(session_id, asset_id, offset_ms, "Sync trigger fired");
        Ok(())
    }

    /// Fire for a session, then mark it active and clear the rendezvous
    ///
    /// The offset is read here, not when the session started, so a change
    /// made while the session was preloading still applies. Returns the
    /// offset that was applied.
    pub async fn fire_session(&self, session_id: u64, asset_id: &str) -> Result<i64> {
        let offset_ms = self.state.sync_offset_ms().await;
        self.fire(session_id, asset_id, offset_ms).await?;

        // A newer session owns the barrier by now; leave it armed
        if !self.state.activate(session_id).await {
            return Err(Error::Superseded { session_id });
        }

        self.barrier.clear();
        Ok(offset_ms)
    }

    async fn ensure_current(&self, session_id: u64) -> Result<()> {
        if self.state.is_current(session_id).await {
            Ok(())
        } else {
            info!(session_id, "Session superseded during sync offset delay");
            Err(Error::Superseded { session_id })
        }
    }
}
