//! Shared controller state
//!
//! Session, activity flag, volume targets and sync offset live behind a
//! single lock so every write is atomic with respect to the others. Readers
//! (the monitor in particular) may observe a value that is about to change;
//! that is acceptable, torn writes are not.

use crate::engine::EngineRole;
use crate::error::{Error, Result};
use crate::playback::session::{CoordinatorPhase, PlaybackSession};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Highest volume on the engine scale
pub const MAX_VOLUME: u16 = 256;

#[derive(Debug)]
struct Inner {
    next_session_id: u64,
    session: Option<PlaybackSession>,
    /// Is a foreground asset currently expected to be playing
    activity: bool,
    phase: CoordinatorPhase,
    master_volume: u16,
    background_volume: u16,
    sync_offset_ms: i64,
    max_abs_offset_ms: i64,
}

/// Point-in-time copy of the shared state
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub session: Option<PlaybackSession>,
    pub active: bool,
    pub phase: CoordinatorPhase,
    pub master_volume: u16,
    pub background_volume: u16,
    pub sync_offset_ms: i64,
}

/// State shared by the coordinator, monitor and request handlers
pub struct SharedState {
    inner: RwLock<Inner>,
}

impl SharedState {
    /// Create state with initial volume targets and sync offset
    pub fn new(
        master_volume: u16,
        background_volume: u16,
        sync_offset_ms: i64,
        max_abs_offset_ms: i64,
    ) -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_session_id: 1,
                session: None,
                activity: false,
                phase: CoordinatorPhase::Idle,
                master_volume: master_volume.min(MAX_VOLUME),
                background_volume: background_volume.min(MAX_VOLUME),
                sync_offset_ms,
                max_abs_offset_ms,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Start a new session, invalidating any previous one
    ///
    /// Returns the new session id. The activity flag drops to false until
    /// the new session is triggered.
    pub async fn begin_session(&self, asset_id: &str, path: PathBuf) -> u64 {
        let mut inner = self.inner.write().await;
        let session_id = inner.next_session_id;
        inner.next_session_id += 1;

        if let Some(previous) = inner.session.replace(PlaybackSession {
            session_id,
            asset_id: asset_id.to_string(),
            path,
            active: false,
            started_at: None,
        }) {
            info!(
                previous = previous.session_id,
                session_id, "Superseding previous session"
            );
        }

        inner.activity = false;
        inner.phase = CoordinatorPhase::Requested;
        session_id
    }

    /// Whether `session_id` is still the current session
    pub async fn is_current(&self, session_id: u64) -> bool {
        self.inner
            .read()
            .await
            .session
            .as_ref()
            .is_some_and(|s| s.session_id == session_id)
    }

    /// Advance the coordinator phase if `session_id` is still current
    pub async fn set_phase(&self, session_id: u64, phase: CoordinatorPhase) -> bool {
        let mut inner = self.inner.write().await;
        let current = inner
            .session
            .as_ref()
            .is_some_and(|s| s.session_id == session_id);
        if current {
            debug!(session_id, %phase, "Coordinator phase");
            inner.phase = phase;
        }
        current
    }

    /// Mark the session as playing on both sides
    pub async fn activate(&self, session_id: u64) -> bool {
        let mut inner = self.inner.write().await;
        match inner.session.as_mut() {
            Some(session) if session.session_id == session_id => {
                session.active = true;
                session.started_at = Some(Utc::now());
                inner.activity = true;
                inner.phase = CoordinatorPhase::Active;
                true
            }
            _ => false,
        }
    }

    /// Abandon a session that failed before becoming active
    pub async fn abort(&self, session_id: u64) -> bool {
        let mut inner = self.inner.write().await;
        let current = inner
            .session
            .as_ref()
            .is_some_and(|s| s.session_id == session_id);
        if current {
            inner.session = None;
            inner.activity = false;
            inner.phase = CoordinatorPhase::Aborted;
        }
        current
    }

    /// Clear a session whose track ended naturally
    ///
    /// No-op if a newer session has taken over since the caller sampled
    /// `session_id`.
    pub async fn complete(&self, session_id: u64) -> bool {
        let mut inner = self.inner.write().await;
        let current = inner
            .session
            .as_ref()
            .is_some_and(|s| s.session_id == session_id);
        if current {
            inner.session = None;
            inner.activity = false;
            inner.phase = CoordinatorPhase::Idle;
        }
        current
    }

    /// Clear whatever session exists (explicit stop)
    pub async fn stop(&self) -> Option<PlaybackSession> {
        let mut inner = self.inner.write().await;
        inner.activity = false;
        inner.phase = CoordinatorPhase::Idle;
        inner.session.take()
    }

    /// Set the activity flag without touching the session (pause/resume)
    ///
    /// Only an active session can be resumed; returns the resulting flag.
    pub async fn set_activity(&self, active: bool) -> bool {
        let mut inner = self.inner.write().await;
        let has_active_session = inner.session.as_ref().is_some_and(|s| s.active);
        inner.activity = active && has_active_session;
        inner.activity
    }

    pub async fn is_active(&self) -> bool {
        self.inner.read().await.activity
    }

    pub async fn current_session(&self) -> Option<PlaybackSession> {
        self.inner.read().await.session.clone()
    }

    pub async fn phase(&self) -> CoordinatorPhase {
        self.inner.read().await.phase
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.read().await;
        StateSnapshot {
            session: inner.session.clone(),
            active: inner.activity,
            phase: inner.phase,
            master_volume: inner.master_volume,
            background_volume: inner.background_volume,
            sync_offset_ms: inner.sync_offset_ms,
        }
    }

    // ------------------------------------------------------------------
    // Volume targets and sync offset
    // ------------------------------------------------------------------

    /// Remembered target volume for an engine role
    pub async fn volume_target(&self, role: EngineRole) -> u16 {
        let inner = self.inner.read().await;
        match role {
            EngineRole::Master => inner.master_volume,
            EngineRole::Background => inner.background_volume,
        }
    }

    /// Set target volume (0..=256)
    pub async fn set_volume_target(&self, role: EngineRole, level: u16) -> Result<()> {
        if level > MAX_VOLUME {
            return Err(Error::InvalidInput(format!(
                "volume {} out of range 0..={}",
                level, MAX_VOLUME
            )));
        }

        let mut inner = self.inner.write().await;
        match role {
            EngineRole::Master => inner.master_volume = level,
            EngineRole::Background => inner.background_volume = level,
        }
        info!(%role, level, "Volume target updated");
        Ok(())
    }

    /// Signed sync offset, read at trigger time
    pub async fn sync_offset_ms(&self) -> i64 {
        self.inner.read().await.sync_offset_ms
    }

    /// Set the signed sync offset
    pub async fn set_sync_offset_ms(&self, offset_ms: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        if offset_ms.unsigned_abs() > inner.max_abs_offset_ms.unsigned_abs() {
            return Err(Error::InvalidInput(format!(
                "sync offset {}ms exceeds limit of ±{}ms",
                offset_ms, inner.max_abs_offset_ms
            )));
        }
        inner.sync_offset_ms = offset_ms;
        info!(offset_ms, "Sync offset updated");
        Ok(())
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(MAX_VOLUME, MAX_VOLUME, 0, 10_000)
    }
}
