//! Playback session and coordinator phase types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// One accepted play request
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSession {
    /// Monotonically increasing id, unique per play request
    pub session_id: u64,
    /// Opaque asset identifier
    pub asset_id: String,
    /// Resolved local path of the asset
    pub path: PathBuf,
    /// True once both sides were triggered
    pub active: bool,
    /// When the trigger fired
    pub started_at: Option<DateTime<Utc>>,
}

/// Coordinator state machine position
///
/// `Requested → DuckingBackground → PreloadingMaster → PreloadingExternal →
/// AwaitingRendezvous → Triggered → Active`, with `Aborted` reachable from
/// any preload or rendezvous phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorPhase {
    Idle,
    Requested,
    DuckingBackground,
    PreloadingMaster,
    PreloadingExternal,
    AwaitingRendezvous,
    Triggered,
    Active,
    Aborted,
}

impl std::fmt::Display for CoordinatorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CoordinatorPhase::Idle => "Idle",
            CoordinatorPhase::Requested => "Requested",
            CoordinatorPhase::DuckingBackground => "DuckingBackground",
            CoordinatorPhase::PreloadingMaster => "PreloadingMaster",
            CoordinatorPhase::PreloadingExternal => "PreloadingExternal",
            CoordinatorPhase::AwaitingRendezvous => "AwaitingRendezvous",
            CoordinatorPhase::Triggered => "Triggered",
            CoordinatorPhase::Active => "Active",
            CoordinatorPhase::Aborted => "Aborted",
        };
        write!(f, "{}", name)
    }
}
