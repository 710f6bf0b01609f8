//! Error types for kjc-controller
//!
//! Every failure is local to one request or one coordinator run. None of
//! them is fatal to the process or to the playback monitor.

use crate::engine::{EngineRole, PlayState};
use thiserror::Error;

/// Main error type for kjc-controller
#[derive(Error, Debug)]
pub enum Error {
    /// Engine unreachable, timed out, or returned an unreadable response
    #[error("Transport failure talking to {role} engine: {cause}")]
    Transport {
        role: EngineRole,
        cause: String,
    },

    /// Engine answered with a non-success HTTP status
    #[error("{role} engine rejected command (HTTP {status})")]
    EngineResponse {
        role: EngineRole,
        status: u16,
    },

    /// Master engine did not reach the paused state after preloading
    #[error("Preload of {asset_id} failed: master engine is {observed}")]
    PreloadFailed {
        asset_id: String,
        observed: PlayState,
    },

    /// One or both parties never signaled readiness
    #[error("Rendezvous timed out (master ready: {master_ready}, external ready: {external_ready})")]
    RendezvousTimeout {
        master_ready: bool,
        external_ready: bool,
    },

    /// Asset id has no resolvable local path
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// A newer play request took over while this run was in flight
    #[error("Session {session_id} superseded by a newer play request")]
    Superseded { session_id: u64 },

    /// Invalid request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Transport { .. } => "transport_failure",
            Error::EngineResponse { .. } => "engine_response",
            Error::PreloadFailed { .. } => "preload_failed",
            Error::RendezvousTimeout { .. } => "rendezvous_timeout",
            Error::NotFound(_) => "not_found",
            Error::Superseded { .. } => "superseded",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config",
            Error::Http(_) => "http",
            Error::Internal(_) => "internal",
        }
    }
}

impl From<kjc_common::Error> for Error {
    fn from(err: kjc_common::Error) -> Self {
        match err {
            kjc_common::Error::NotFound(msg) => Error::NotFound(msg),
            kjc_common::Error::InvalidInput(msg) => Error::InvalidInput(msg),
            kjc_common::Error::Config(msg) => Error::Config(msg),
            kjc_common::Error::TomlParse(e) => Error::Config(e.to_string()),
            other => Error::Internal(other.to_string()),
        }
    }
}

/// Convenience Result type using kjc-controller Error
pub type Result<T> = std::result::Result<T, Error>;
