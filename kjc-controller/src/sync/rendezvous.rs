//! Readiness rendezvous between the master engine and the display client
//!
//! Two-party barrier: the coordinator arms it for one asset, the master
//! side and the client side each signal readiness once, and the trigger
//! proceeds only when both flags are set. A signal that arrives before the
//! coordinator starts waiting is not lost: the barrier state lives in a
//! watch channel and the wait checks the current value first.
//!
//! Every `arm` bumps a generation counter. A waiter of an older generation
//! wakes up and reports [`RendezvousOutcome::Rearmed`] instead of waiting
//! out its timeout, and signals carrying a stale generation or asset id are
//! ignored.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Which parties had signaled at a given moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Readiness {
    pub master_ready: bool,
    pub external_ready: bool,
}

impl Readiness {
    pub fn both(&self) -> bool {
        self.master_ready && self.external_ready
    }
}

/// Result of waiting on the barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendezvousOutcome {
    /// Both parties signaled
    Satisfied,
    /// Deadline passed; carries the flags observed at the deadline
    TimedOut(Readiness),
    /// The barrier was re-armed or cleared for another session
    Rearmed,
}

#[derive(Debug, Clone, Default)]
struct BarrierState {
    generation: u64,
    asset_id: Option<String>,
    readiness: Readiness,
}

/// Two-flag barrier with bounded wait
pub struct ReadinessBarrier {
    tx: watch::Sender<BarrierState>,
}

impl ReadinessBarrier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BarrierState::default());
        Self { tx }
    }

    /// Clear both flags and arm for `asset_id`; returns the new generation
    pub fn arm(&self, asset_id: &str) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|s| {
            s.generation += 1;
            s.asset_id = Some(asset_id.to_string());
            s.readiness = Readiness::default();
            generation = s.generation;
        });
        debug!(asset_id, generation, "Rendezvous armed");
        generation
    }

    /// Disarm and clear both flags
    ///
    /// Wakes any waiter, which then reports [`RendezvousOutcome::Rearmed`].
    pub fn clear(&self) {
        self.tx.send_modify(|s| {
            s.generation += 1;
            s.asset_id = None;
            s.readiness = Readiness::default();
        });
    }

    /// Master engine finished preloading for `generation`
    pub fn signal_master_ready(&self, generation: u64) -> bool {
        let accepted = self.tx.send_if_modified(|s| {
            if s.generation != generation || s.asset_id.is_none() || s.readiness.master_ready {
                return false;
            }
            s.readiness.master_ready = true;
            true
        });
        if accepted {
            debug!(generation, "Master ready");
        }
        accepted
    }

    /// Display client reported it has `asset_id` loaded
    ///
    /// Ignored unless the barrier is armed for that same asset.
    pub fn signal_external_ready(&self, asset_id: &str) -> bool {
        let accepted = self.tx.send_if_modified(|s| {
            if s.asset_id.as_deref() != Some(asset_id) || s.readiness.external_ready {
                return false;
            }
            s.readiness.external_ready = true;
            true
        });
        if accepted {
            info!(asset_id, "Display client ready");
        } else {
            debug!(asset_id, "Ignoring ready notification for an unarmed asset");
        }
        accepted
    }

    /// Current flags
    pub fn readiness(&self) -> Readiness {
        self.tx.borrow().readiness
    }

    /// Asset the barrier is armed for
    pub fn armed_asset(&self) -> Option<String> {
        self.tx.borrow().asset_id.clone()
    }

    /// Wait until both flags of `generation` are set, or `timeout` elapses
    ///
    /// Partial readiness at the deadline is reported as a timeout, never as
    /// success.
    pub async fn wait(&self, generation: u64, timeout: Duration) -> RendezvousOutcome {
        let mut rx = self.tx.subscribe();

        let waited = tokio::time::timeout(timeout, async {
            rx.wait_for(|s| s.generation != generation || s.readiness.both())
                .await
                .map(|s| s.generation == generation)
        })
        .await;

        match waited {
            Ok(Ok(true)) => RendezvousOutcome::Satisfied,
            Ok(Ok(false)) => RendezvousOutcome::Rearmed,
            Ok(Err(_)) => RendezvousOutcome::Rearmed,
            Err(_) => {
                let state = self.tx.borrow().clone();
                if state.generation != generation {
                    return RendezvousOutcome::Rearmed;
                }
                warn!(
                    generation,
                    master_ready = state.readiness.master_ready,
                    external_ready = state.readiness.external_ready,
                    "Rendezvous timed out"
                );
                RendezvousOutcome::TimedOut(state.readiness)
            }
        }
    }
}

impl Default for ReadinessBarrier {
    fn default() -> Self {
        Self::new()
    }
}
