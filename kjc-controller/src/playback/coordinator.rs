//! Preload-and-trigger coordinator
//!
//! Drives one play request through
//! `Requested → DuckingBackground → PreloadingMaster → PreloadingExternal →
//! AwaitingRendezvous → Triggered → Active`.
//!
//! The master engine is loaded with play-then-pause: some engines only
//! bring media fully into a ready state while transitioning to play, so
//! pausing right after is more reliable than loading straight into pause.
//! The display client is asked to preload the same asset while the master
//! loads, and both sides meet at the readiness rendezvous before the
//! trigger fires.
//!
//! A newer play request (or a stop) supersedes a run in flight. The run
//! notices at its next phase change, returns [`Error::Superseded`] and
//! leaves engines and background music to the newer owner.

use super::session::CoordinatorPhase;
use crate::audio::DuckingController;
use crate::config::Timings;
use crate::engine::{EngineCommand, EngineControl, EngineRole, EngineStatus, PlayState};
use crate::error::{Error, Result};
use crate::resolver::AssetResolver;
use crate::sse::ClientPush;
use crate::state::{SharedState, StateSnapshot};
use crate::sync::{ReadinessBarrier, RendezvousOutcome, SyncTrigger};
use kjc_common::ClientEvent;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful play request
#[derive(Debug, Clone, Serialize)]
pub struct PlayOutcome {
    pub session_id: u64,
    pub video_id: String,
    pub sync_offset_ms: i64,
}

/// Master engine status combined with controller state
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: PlayState,
    pub time: u64,
    pub length: u64,
    pub current_video_id: Option<String>,
    pub active: bool,
    pub phase: CoordinatorPhase,
    pub sync_offset_ms: i64,
}

impl StatusReport {
    fn new(status: EngineStatus, snapshot: StateSnapshot) -> Self {
        Self {
            state: status.state,
            time: status.time,
            length: status.length,
            current_video_id: snapshot.session.map(|s| s.asset_id),
            active: snapshot.active,
            phase: snapshot.phase,
            sync_offset_ms: snapshot.sync_offset_ms,
        }
    }
}

/// Orchestrates play requests and playback controls
pub struct Coordinator {
    master: Arc<dyn EngineControl>,
    push: Arc<dyn ClientPush>,
    state: Arc<SharedState>,
    barrier: Arc<ReadinessBarrier>,
    ducking: Arc<DuckingController>,
    trigger: SyncTrigger,
    resolver: Arc<dyn AssetResolver>,
    timings: Timings,
}

impl Coordinator {
    pub fn new(
        master: Arc<dyn EngineControl>,
        push: Arc<dyn ClientPush>,
        state: Arc<SharedState>,
        barrier: Arc<ReadinessBarrier>,
        ducking: Arc<DuckingController>,
        resolver: Arc<dyn AssetResolver>,
        timings: Timings,
    ) -> Self {
        let trigger = SyncTrigger::new(
            Arc::clone(&master),
            Arc::clone(&push),
            Arc::clone(&state),
            Arc::clone(&barrier),
        );

        Self {
            master,
            push,
            state,
            barrier,
            ducking,
            trigger,
            resolver,
            timings,
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn ducking(&self) -> &Arc<DuckingController> {
        &self.ducking
    }

    // ------------------------------------------------------------------
    // Play request
    // ------------------------------------------------------------------

    /// Preload `asset_id` on both sides and start them together
    pub async fn play(&self, asset_id: &str) -> Result<PlayOutcome> {
        // Unknown assets fail before any engine is touched
        let path = self.resolver.resolve(asset_id)?;

        let session_id = self.state.begin_session(asset_id, path.clone()).await;
        let generation = self.barrier.arm(asset_id);
        info!(session_id, asset_id, path = %path.display(), "Play request accepted");

        match self.run(session_id, generation, asset_id, &path).await {
            Ok(sync_offset_ms) => {
                info!(session_id, asset_id, sync_offset_ms, "Playback started on both sides");
                Ok(PlayOutcome {
                    session_id,
                    video_id: asset_id.to_string(),
                    sync_offset_ms,
                })
            }
            Err(e @ Error::Superseded { .. }) => {
                info!(session_id, asset_id, "Play request superseded");
                Err(e)
            }
            Err(e) => {
                warn!(session_id, asset_id, "Play request aborted: {}", e);
                self.abort(session_id).await;
                Err(e)
            }
        }
    }

    /// Returns the sync offset the trigger applied
    async fn run(&self, session_id: u64, generation: u64, asset_id: &str, path: &Path) -> Result<i64> {
        self.advance(session_id, CoordinatorPhase::DuckingBackground).await?;
        let master_status = self.master.query_status().await?;
        if master_status.state == PlayState::Playing {
            debug!("Master mid-playback, background already ducked");
        } else {
            self.ducking.fade_out_background();
            tokio::time::sleep(self.timings.duck_settle).await;
        }

        self.advance(session_id, CoordinatorPhase::PreloadingMaster).await?;
        // Client loads in parallel with the master
        self.push.publish(ClientEvent::Preload {
            video_id: asset_id.to_string(),
        });
        self.preload_master(session_id, asset_id, path).await?;

        self.advance(session_id, CoordinatorPhase::PreloadingExternal).await?;
        self.barrier.signal_master_ready(generation);

        self.advance(session_id, CoordinatorPhase::AwaitingRendezvous).await?;
        match self
            .barrier
            .wait(generation, self.timings.rendezvous_timeout)
            .await
        {
            RendezvousOutcome::Satisfied => {}
            RendezvousOutcome::Rearmed => return Err(Error::Superseded { session_id }),
            RendezvousOutcome::TimedOut(readiness) => {
                return Err(Error::RendezvousTimeout {
                    master_ready: readiness.master_ready,
                    external_ready: readiness.external_ready,
                })
            }
        }

        self.advance(session_id, CoordinatorPhase::Triggered).await?;
        self.trigger.fire_session(session_id, asset_id).await
    }

    /// Load the asset into the master engine and hold it paused
    async fn preload_master(&self, session_id: u64, asset_id: &str, path: &Path) -> Result<()> {
        let volume = self.state.volume_target(EngineRole::Master).await;

        self.master.send(EngineCommand::PlaylistEmpty).await?;
        self.master
            .send(EngineCommand::Enqueue {
                path: path.to_path_buf(),
            })
            .await?;
        self.master.send(EngineCommand::Volume { level: volume }).await?;
        self.master.send(EngineCommand::Play).await?;
        self.master.send(EngineCommand::Pause).await?;

        tokio::time::sleep(self.timings.preload_settle).await;
        self.ensure_current(session_id).await?;

        let mut status = self.master.query_status().await?;
        if status.state == PlayState::Playing {
            // Pause raced the start of playback; one more attempt
            debug!("Master still playing after preload, pausing again");
            self.master.send(EngineCommand::Pause).await?;
            tokio::time::sleep(self.timings.preload_settle).await;
            status = self.master.query_status().await?;
        }

        if status.state != PlayState::Paused {
            return Err(Error::PreloadFailed {
                asset_id: asset_id.to_string(),
                observed: status.state,
            });
        }

        if !status.fullscreen {
            if let Err(e) = self.master.send(EngineCommand::ToggleFullscreen).await {
                warn!("Could not switch master to fullscreen: {}", e);
            }
        }

        debug!(asset_id, "Master preloaded and paused");
        Ok(())
    }

    /// Fall back to background music after a failed run
    ///
    /// The master is left paused on its hidden load; the next play request
    /// resets its playlist.
    async fn abort(&self, session_id: u64) {
        if !self.state.abort(session_id).await {
            return;
        }
        self.barrier.clear();
        self.push.publish(ClientEvent::Stop);
        self.ducking.fade_in_background();
    }

    async fn advance(&self, session_id: u64, phase: CoordinatorPhase) -> Result<()> {
        if self.state.set_phase(session_id, phase).await {
            Ok(())
        } else {
            Err(Error::Superseded { session_id })
        }
    }

    async fn ensure_current(&self, session_id: u64) -> Result<()> {
        if self.state.is_current(session_id).await {
            Ok(())
        } else {
            Err(Error::Superseded { session_id })
        }
    }

    // ------------------------------------------------------------------
    // Inbound client readiness
    // ------------------------------------------------------------------

    /// Display client reports it has `asset_id` loaded
    pub fn client_ready(&self, asset_id: &str) -> bool {
        self.barrier.signal_external_ready(asset_id)
    }

    // ------------------------------------------------------------------
    // Playback controls
    // ------------------------------------------------------------------

    /// Toggle pause on both sides; background music fills the pause
    pub async fn pause_resume(&self) -> Result<PlayState> {
        self.require_started_session().await?;

        self.master.send(EngineCommand::TogglePause).await?;
        let status = self.master.query_status().await?;

        match status.state {
            PlayState::Paused => {
                self.state.set_activity(false).await;
                self.push.publish(ClientEvent::Pause);
                self.ducking.fade_in_background();
                info!("Playback paused");
            }
            PlayState::Playing => {
                self.state.set_activity(true).await;
                self.push.publish(ClientEvent::Resume);
                self.ducking.fade_out_background();
                info!("Playback resumed");
            }
            PlayState::Stopped => {
                debug!("Pause toggled on a stopped master");
            }
        }
        Ok(status.state)
    }

    /// Seek both sides back to the start
    pub async fn restart(&self) -> Result<()> {
        self.require_started_session().await?;

        self.master.send(EngineCommand::Seek { seconds: 0 }).await?;
        self.push.publish(ClientEvent::Restart);
        info!("Playback restarted");
        Ok(())
    }

    /// Stop foreground playback and bring background music back
    ///
    /// State is cleared even when the master engine cannot be reached.
    pub async fn stop(&self) -> Result<()> {
        let prior = self.master.query_status().await.map(|s| s.state);
        let result = self.master.send(EngineCommand::Stop).await;

        let had_session = self.state.stop().await.is_some();
        self.barrier.clear();
        self.push.publish(ClientEvent::Stop);

        // Background is ducked whenever the master holds media
        let master_was_loaded = matches!(prior, Ok(PlayState::Playing | PlayState::Paused));
        if had_session || master_was_loaded {
            self.ducking.fade_in_background();
        }
        info!(had_session, "Playback stopped");

        result.map(|_| ())
    }

    /// Master engine status plus session information
    pub async fn status(&self) -> Result<StatusReport> {
        let status = self.master.query_status().await?;
        let snapshot = self.state.snapshot().await;
        Ok(StatusReport::new(status, snapshot))
    }

    // ------------------------------------------------------------------
    // Volume / offset configuration
    // ------------------------------------------------------------------

    /// Set the remembered target volume for a role and apply it
    pub async fn set_volume_target(&self, role: EngineRole, level: u16) -> Result<()> {
        self.state.set_volume_target(role, level).await?;

        match role {
            EngineRole::Master => {
                if self.state.current_session().await.is_some() {
                    self.master.send(EngineCommand::Volume { level }).await?;
                }
            }
            EngineRole::Background => {
                self.ducking.retarget();
            }
        }
        Ok(())
    }

    /// Set the signed sync offset used by the next trigger
    pub async fn set_sync_offset_ms(&self, offset_ms: i64) -> Result<()> {
        self.state.set_sync_offset_ms(offset_ms).await
    }

    async fn require_started_session(&self) -> Result<()> {
        match self.state.current_session().await {
            Some(session) if session.active => Ok(()),
            _ => Err(Error::InvalidInput("nothing is playing".to_string())),
        }
    }
}
