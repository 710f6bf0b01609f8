//! Start synchronization between the master engine and the display client

pub mod rendezvous;
pub mod trigger;

pub use rendezvous::{Readiness, ReadinessBarrier, RendezvousOutcome};
pub use trigger::SyncTrigger;
