//! Component assembly
//!
//! Wires engines, push channel, shared state, ducking, coordinator and
//! monitor together. `main` builds one from configuration; tests build one
//! around in-process engine doubles.

use crate::audio::{DuckingController, VolumeFader};
use crate::config::Timings;
use crate::engine::EngineControl;
use crate::playback::{Coordinator, PlaybackMonitor};
use crate::resolver::AssetResolver;
use crate::sse::SseBroadcaster;
use crate::state::SharedState;
use crate::sync::ReadinessBarrier;
use kjc_common::config::BackgroundTrackConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Events buffered per display client before it counts as lagging
const PUSH_CHANNEL_CAPACITY: usize = 100;

/// Everything the HTTP layer and background tasks share
#[derive(Clone)]
pub struct Controller {
    pub coordinator: Arc<Coordinator>,
    pub monitor: Arc<PlaybackMonitor>,
    pub broadcaster: SseBroadcaster,
    pub state: Arc<SharedState>,
}

impl Controller {
    pub fn new(
        master: Arc<dyn EngineControl>,
        background: Arc<dyn EngineControl>,
        resolver: Arc<dyn AssetResolver>,
        state: Arc<SharedState>,
        timings: Timings,
        fade_steps: u32,
        track: BackgroundTrackConfig,
    ) -> Self {
        let broadcaster = SseBroadcaster::new(PUSH_CHANNEL_CAPACITY);
        let push: Arc<dyn crate::sse::ClientPush> = Arc::new(broadcaster.clone());
        let barrier = Arc::new(ReadinessBarrier::new());

        let ducking = Arc::new(DuckingController::new(
            background,
            Arc::clone(&state),
            VolumeFader::new(fade_steps),
            timings.fade_duration,
            track,
        ));

        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&master),
            Arc::clone(&push),
            Arc::clone(&state),
            barrier,
            Arc::clone(&ducking),
            resolver,
            timings,
        ));

        let monitor = Arc::new(PlaybackMonitor::new(
            master,
            push,
            Arc::clone(&state),
            ducking,
            timings.monitor_interval,
        ));

        Self {
            coordinator,
            monitor,
            broadcaster,
            state,
        }
    }

    /// Spawn the monitor loop and bring background music up
    pub fn start(&self) -> JoinHandle<()> {
        self.coordinator.ducking().fade_in_background();
        Arc::clone(&self.monitor).start()
    }
}
