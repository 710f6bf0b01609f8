//! Push-channel events exchanged with the external display client
//!
//! The controller never polls the display client. Everything it needs the
//! client to do is expressed as one of these events, serialized as JSON with
//! a `type` tag and delivered over the push channel.

use serde::{Deserialize, Serialize};

/// Event sent from the controller to the external display client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Load the asset and report back with a ready notification
    Preload {
        /// Opaque asset identifier
        video_id: String,
    },

    /// Start playback of the preloaded asset immediately
    StartNow {
        /// Asset the start applies to
        video_id: String,
        /// Wall-clock send time (ms since UNIX epoch)
        sent_at_ms: u64,
    },

    /// Pause playback
    Pause,

    /// Resume playback after a pause
    Resume,

    /// Seek back to the beginning and keep playing
    Restart,

    /// Stop playback and clear the current asset
    Stop,

    /// Advisory position of the master engine for drift correction
    PeriodicSync {
        /// Elapsed seconds reported by the master engine
        time: u64,
        /// Total length in seconds reported by the master engine
        length: u64,
        /// Wall-clock sample time (ms since UNIX epoch)
        sampled_at_ms: u64,
    },
}

impl ClientEvent {
    /// Create a StartNow event stamped with the current time
    pub fn start_now(video_id: impl Into<String>) -> Self {
        Self::StartNow {
            video_id: video_id.into(),
            sent_at_ms: crate::time::now_ms(),
        }
    }

    /// Create a PeriodicSync event stamped with the current time
    pub fn periodic_sync(time: u64, length: u64) -> Self {
        Self::PeriodicSync {
            time,
            length,
            sampled_at_ms: crate::time::now_ms(),
        }
    }

    /// Event name used on the wire (SSE `event:` field)
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientEvent::Preload { .. } => "preload",
            ClientEvent::StartNow { .. } => "start_now",
            ClientEvent::Pause => "pause",
            ClientEvent::Resume => "resume",
            ClientEvent::Restart => "restart",
            ClientEvent::Stop => "stop",
            ClientEvent::PeriodicSync { .. } => "periodic_sync",
        }
    }
}
