//! Coordinator, monitor and ducking wired around engine and push doubles

use super::{MockEngine, RecordingPush};
use kjc_common::config::BackgroundTrackConfig;
use kjc_common::ClientEvent;
use kjc_controller::audio::{DuckingController, VolumeFader};
use kjc_controller::config::Timings;
use kjc_controller::engine::{EngineControl, EngineRole};
use kjc_controller::playback::{Coordinator, PlaybackMonitor};
use kjc_controller::resolver::{AssetResolver, DirectoryResolver};
use kjc_controller::sse::ClientPush;
use kjc_controller::state::SharedState;
use kjc_controller::sync::ReadinessBarrier;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const TEST_FADE_STEPS: u32 = 10;
pub const MASTER_VOLUME: u16 = 200;
pub const BACKGROUND_VOLUME: u16 = 128;

/// Shortened timing budget; tests run with paused time anyway
pub fn test_timings() -> Timings {
    Timings {
        fade_duration: Duration::from_millis(1000),
        duck_settle: Duration::from_millis(1200),
        preload_settle: Duration::from_millis(100),
        rendezvous_timeout: Duration::from_secs(5),
        monitor_interval: Duration::from_millis(500),
    }
}

pub struct Harness {
    pub master: Arc<MockEngine>,
    pub background: Arc<MockEngine>,
    pub push: Arc<RecordingPush>,
    pub state: Arc<SharedState>,
    pub barrier: Arc<ReadinessBarrier>,
    pub ducking: Arc<DuckingController>,
    pub coordinator: Arc<Coordinator>,
    pub monitor: PlaybackMonitor,
    pub timings: Timings,
    pub video_dir: TempDir,
}

impl Harness {
    /// Videos `abc12345` and `def67890` available, background playing
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    pub fn with_offset(sync_offset_ms: i64) -> Self {
        let video_dir = TempDir::new().unwrap();
        for id in ["abc12345", "def67890"] {
            std::fs::write(video_dir.path().join(format!("{}.mp4", id)), b"video").unwrap();
        }

        let master = Arc::new(MockEngine::new(EngineRole::Master));
        let background = Arc::new(MockEngine::playing(EngineRole::Background, BACKGROUND_VOLUME));
        let push = Arc::new(RecordingPush::new());
        let state = Arc::new(SharedState::new(
            MASTER_VOLUME,
            BACKGROUND_VOLUME,
            sync_offset_ms,
            10_000,
        ));
        let barrier = Arc::new(ReadinessBarrier::new());
        let timings = test_timings();

        let master_dyn: Arc<dyn EngineControl> = master.clone();
        let background_dyn: Arc<dyn EngineControl> = background.clone();
        let push_dyn: Arc<dyn ClientPush> = push.clone();
        let resolver: Arc<dyn AssetResolver> =
            Arc::new(DirectoryResolver::new(video_dir.path().to_path_buf(), "mp4"));

        let ducking = Arc::new(DuckingController::new(
            background_dyn,
            Arc::clone(&state),
            VolumeFader::new(TEST_FADE_STEPS),
            timings.fade_duration,
            BackgroundTrackConfig {
                randomize_start: false,
                tail_guard_s: 30,
            },
        ));

        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&master_dyn),
            Arc::clone(&push_dyn),
            Arc::clone(&state),
            Arc::clone(&barrier),
            Arc::clone(&ducking),
            resolver,
            timings,
        ));

        let monitor = PlaybackMonitor::new(
            master_dyn,
            push_dyn,
            Arc::clone(&state),
            Arc::clone(&ducking),
            timings.monitor_interval,
        );

        Self {
            master,
            background,
            push,
            state,
            barrier,
            ducking,
            coordinator,
            monitor,
            timings,
            video_dir,
        }
    }

    /// Simulated display client: answers every preload with a ready
    /// notification after `load_time`
    pub fn spawn_display_client(&self, load_time: Duration) -> JoinHandle<()> {
        let mut rx = self.push.subscribe();
        let coordinator = Arc::clone(&self.coordinator);

        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if let ClientEvent::Preload { video_id } = event {
                    let coordinator = Arc::clone(&coordinator);
                    tokio::spawn(async move {
                        tokio::time::sleep(load_time).await;
                        coordinator.client_ready(&video_id);
                    });
                }
            }
        })
    }

    /// Play `asset_id` to completion of the play request with a display
    /// client that loads in 200ms
    pub async fn play_with_client(&self, asset_id: &str) -> kjc_controller::Result<u64> {
        let client = self.spawn_display_client(Duration::from_millis(200));
        let result = self.coordinator.play(asset_id).await.map(|o| o.session_id);
        client.abort();
        result
    }

    /// Let spawned fades run to completion
    pub async fn settle_fades(&self) {
        tokio::time::sleep(self.timings.fade_duration + Duration::from_millis(100)).await;
    }
}
