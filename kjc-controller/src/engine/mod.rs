//! Engine control adapter
//!
//! Issues commands to a stateful playback engine (the foreground "master"
//! or the background music engine) and parses its status reply. Every
//! command returns the engine status observed right after the command, so
//! callers never need to cache state beyond one call.

pub mod command;
pub mod status;
pub mod vlc;

pub use command::EngineCommand;
pub use status::{EngineStatus, PlayState};
pub use vlc::VlcEngine;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Logical role of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineRole {
    /// Foreground engine playing the requested asset
    Master,
    /// Background music engine that is ducked around foreground playback
    Background,
}

impl std::fmt::Display for EngineRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineRole::Master => write!(f, "master"),
            EngineRole::Background => write!(f, "background"),
        }
    }
}

/// Command surface of one playback engine
///
/// Implementations must not interleave two commands to the same engine:
/// a command issued while another is in flight waits for it to finish.
/// Every call is bounded by a timeout and fails with
/// [`Error::Transport`](crate::Error::Transport) rather than blocking.
#[async_trait]
pub trait EngineControl: Send + Sync {
    /// Role this engine plays
    fn role(&self) -> EngineRole;

    /// Send a command and return the status reported afterwards
    async fn send(&self, command: EngineCommand) -> Result<EngineStatus>;

    /// Query status without changing engine state
    async fn query_status(&self) -> Result<EngineStatus> {
        self.send(EngineCommand::Status).await
    }
}
