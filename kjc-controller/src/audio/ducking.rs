//! Background music ducking
//!
//! Fades the background engine out before foreground playback and back in
//! afterwards. Both directions return immediately with a handle to the
//! spawned fade; callers that do not care about completion drop it.

use super::fader::{FadeOutcome, VolumeFader};
use crate::engine::{EngineCommand, EngineControl, EngineRole, PlayState};
use crate::error::Result;
use crate::state::SharedState;
use kjc_common::config::BackgroundTrackConfig;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle to a spawned background fade
pub type FadeHandle = JoinHandle<Result<FadeOutcome>>;

/// Fade-in / fade-out of the background engine
pub struct DuckingController {
    engine: Arc<dyn EngineControl>,
    state: Arc<SharedState>,
    fader: VolumeFader,
    fade_duration: Duration,
    track: BackgroundTrackConfig,
}

impl DuckingController {
    pub fn new(
        engine: Arc<dyn EngineControl>,
        state: Arc<SharedState>,
        fader: VolumeFader,
        fade_duration: Duration,
        track: BackgroundTrackConfig,
    ) -> Self {
        Self {
            engine,
            state,
            fader,
            fade_duration,
            track,
        }
    }

    /// Bring background music back: volume 0, resume, fade up to target
    pub fn fade_in_background(&self) -> FadeHandle {
        let token = self.fader.begin(EngineRole::Background);
        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.state);
        let fader = self.fader.clone();
        let duration = self.fade_duration;
        let track = self.track.clone();

        tokio::spawn(async move {
            let result = async {
                let status = engine.send(EngineCommand::Volume { level: 0 }).await?;

                if track.randomize_start && status.length > track.tail_guard_s {
                    let position = rand::thread_rng().gen_range(0..status.length - track.tail_guard_s);
                    debug!(position, "Randomizing background start position");
                    engine.send(EngineCommand::Seek { seconds: position }).await?;
                }

                // A stopped engine needs play; a paused one resumes in place
                let start = if status.state == PlayState::Stopped {
                    EngineCommand::Play
                } else {
                    EngineCommand::Resume
                };
                engine.send(start).await?;

                if token.is_cancelled() {
                    return Ok(FadeOutcome::Cancelled);
                }

                let target = state.volume_target(EngineRole::Background).await;
                let outcome = fader.fade(engine.as_ref(), 0, target, duration, &token).await?;
                if outcome == FadeOutcome::Completed {
                    info!(target, "Background music faded in");
                }
                Ok(outcome)
            }
            .await;

            if let Err(e) = &result {
                warn!("Background fade-in failed: {}", e);
            }
            result
        })
    }

    /// Duck background music: fade down to 0, then pause
    ///
    /// The ramp starts from the engine's current volume so that ducking
    /// during an unfinished fade-in does not jump up first. An engine that
    /// is not playing is left alone.
    pub fn fade_out_background(&self) -> FadeHandle {
        let token = self.fader.begin(EngineRole::Background);
        let engine = Arc::clone(&self.engine);
        let fader = self.fader.clone();
        let duration = self.fade_duration;

        tokio::spawn(async move {
            let result = async {
                let status = engine.query_status().await?;
                if status.state != PlayState::Playing {
                    debug!(state = %status.state, "Background not playing, skipping fade-out");
                    return Ok(FadeOutcome::Completed);
                }

                let from = status.volume.min(crate::state::MAX_VOLUME);
                let outcome = fader.fade(engine.as_ref(), from, 0, duration, &token).await?;
                if outcome == FadeOutcome::Cancelled || token.is_cancelled() {
                    return Ok(FadeOutcome::Cancelled);
                }
                engine.send(EngineCommand::Pause).await?;
                info!("Background music ducked out");
                Ok(outcome)
            }
            .await;

            if let Err(e) = &result {
                warn!("Background fade-out failed: {}", e);
            }
            result
        })
    }

    /// Ramp a playing background engine to the current target volume
    ///
    /// Used after the background target changes. A paused (ducked) engine
    /// is left alone; it picks up the new target on its next fade-in.
    pub fn retarget(&self) -> FadeHandle {
        let token = self.fader.begin(EngineRole::Background);
        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.state);
        let fader = self.fader.clone();
        let duration = self.fade_duration;

        tokio::spawn(async move {
            let status = engine.query_status().await?;
            if status.state != PlayState::Playing {
                return Ok(FadeOutcome::Completed);
            }
            let target = state.volume_target(EngineRole::Background).await;
            let from = status.volume.min(crate::state::MAX_VOLUME);
            fader.fade(engine.as_ref(), from, target, duration, &token).await
        })
    }

    /// Stop any in-flight background fade without issuing further commands
    pub fn cancel(&self) {
        self.fader.cancel(EngineRole::Background);
    }
}
