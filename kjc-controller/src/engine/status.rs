//! Engine status parsing

use serde::{Deserialize, Serialize};

/// Play state reported by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Playing,
    Paused,
    Stopped,
}

impl std::fmt::Display for PlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayState::Playing => write!(f, "playing"),
            PlayState::Paused => write!(f, "paused"),
            PlayState::Stopped => write!(f, "stopped"),
        }
    }
}

impl std::str::FromStr for PlayState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playing" => Ok(PlayState::Playing),
            "paused" => Ok(PlayState::Paused),
            "stopped" => Ok(PlayState::Stopped),
            other => Err(format!("unrecognized play state '{}'", other)),
        }
    }
}

/// Snapshot of engine status, valid for one call only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub state: PlayState,
    /// Elapsed seconds
    pub time: u64,
    /// Total duration in seconds (0 when unknown)
    pub length: u64,
    /// Volume on the 0-256 scale
    pub volume: u16,
    pub fullscreen: bool,
}

/// Status document as served by the engine
#[derive(Debug, Deserialize)]
struct RawStatus {
    state: String,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    length: i64,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    fullscreen: serde_json::Value,
}

impl EngineStatus {
    /// Parse the engine's JSON status document
    pub fn from_json(body: &[u8]) -> Result<Self, String> {
        let raw: RawStatus =
            serde_json::from_slice(body).map_err(|e| format!("invalid status JSON: {}", e))?;

        let state = raw.state.parse::<PlayState>()?;

        // Fullscreen is reported as a boolean or as 0/1 depending on version
        let fullscreen = match raw.fullscreen {
            serde_json::Value::Bool(b) => b,
            serde_json::Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
            _ => false,
        };

        Ok(Self {
            state,
            time: raw.time.max(0) as u64,
            length: raw.length.max(0) as u64,
            volume: raw.volume.round().clamp(0.0, 512.0) as u16,
            fullscreen,
        })
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }
}
