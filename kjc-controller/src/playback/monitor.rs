//! Background monitoring of the master engine
//!
//! The engine never reports end-of-track by itself, so completion is
//! detected by polling: a track counts as finished at the first poll that
//! sees the engine stopped. Detection therefore lags the real end by up to
//! one polling interval.

use crate::audio::DuckingController;
use crate::engine::{EngineControl, PlayState};
use crate::sse::ClientPush;
use crate::state::SharedState;
use kjc_common::ClientEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What one monitor poll observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorTick {
    /// Nothing expected to play, engine not queried
    Idle,
    /// Master playing; position pushed to the display client
    Synced { time: u64, length: u64 },
    /// Master paused; nothing to do
    Paused,
    /// Track finished, session cleared and background restored
    Completed { session_id: u64 },
    /// Status query failed
    EngineUnavailable,
}

/// Polls the master engine while a session is active
pub struct PlaybackMonitor {
    master: Arc<dyn EngineControl>,
    push: Arc<dyn ClientPush>,
    state: Arc<SharedState>,
    ducking: Arc<DuckingController>,
    interval: Duration,
}

impl PlaybackMonitor {
    pub fn new(
        master: Arc<dyn EngineControl>,
        push: Arc<dyn ClientPush>,
        state: Arc<SharedState>,
        ducking: Arc<DuckingController>,
        interval: Duration,
    ) -> Self {
        Self {
            master,
            push,
            state,
            ducking,
            interval,
        }
    }

    /// Spawn the monitor loop for the lifetime of the process
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Poll forever
    pub async fn run(&self) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Playback monitor started ({}ms interval)", self.interval.as_millis());

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// One poll of the master engine
    pub async fn tick(&self) -> MonitorTick {
        let snapshot = self.state.snapshot().await;
        let session_id = match (&snapshot.session, snapshot.active) {
            (Some(session), true) => session.session_id,
            _ => return MonitorTick::Idle,
        };

        let status = match self.master.query_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Monitor could not read master status: {}", e);
                return MonitorTick::EngineUnavailable;
            }
        };

        match status.state {
            PlayState::Playing => {
                self.push
                    .publish(ClientEvent::periodic_sync(status.time, status.length));
                debug!(time = status.time, length = status.length, "Position synced");
                MonitorTick::Synced {
                    time: status.time,
                    length: status.length,
                }
            }
            PlayState::Paused => MonitorTick::Paused,
            PlayState::Stopped => {
                // A stop or a new play request may have raced this poll
                if !self.state.complete(session_id).await {
                    return MonitorTick::Idle;
                }
                info!(session_id, "Track finished, restoring background music");
                self.ducking.fade_in_background();
                self.push.publish(ClientEvent::Stop);
                MonitorTick::Completed { session_id }
            }
        }
    }
}
