//! Engine command encoding
//!
//! Commands travel as a query string (`command=<name>&<param>=<value>`).
//! `&` and `=` are separators in that syntax, so only the filesystem path
//! parameter is percent-encoded; command keywords are always sent verbatim.

use std::path::PathBuf;

/// One command understood by the engine's HTTP interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// No-op, returns status only
    Status,
    /// Clear the playlist
    PlaylistEmpty,
    /// Append a file to the playlist without starting it
    Enqueue { path: PathBuf },
    /// Start playback of the current playlist item
    Play,
    /// Pause (no-op if already paused)
    Pause,
    /// Resume (no-op if already playing)
    Resume,
    /// Toggle between playing and paused
    TogglePause,
    /// Stop playback
    Stop,
    /// Seek to an absolute position in seconds
    Seek { seconds: u64 },
    /// Set volume on the engine's 0-256 scale
    Volume { level: u16 },
    /// Toggle fullscreen video output
    ToggleFullscreen,
}

impl EngineCommand {
    /// Command keyword, or `None` for a plain status query
    pub fn name(&self) -> Option<&'static str> {
        match self {
            EngineCommand::Status => None,
            EngineCommand::PlaylistEmpty => Some("pl_empty"),
            EngineCommand::Enqueue { .. } => Some("in_enqueue"),
            EngineCommand::Play => Some("pl_play"),
            EngineCommand::Pause => Some("pl_forcepause"),
            EngineCommand::Resume => Some("pl_forceresume"),
            EngineCommand::TogglePause => Some("pl_pause"),
            EngineCommand::Stop => Some("pl_stop"),
            EngineCommand::Seek { .. } => Some("seek"),
            EngineCommand::Volume { .. } => Some("volume"),
            EngineCommand::ToggleFullscreen => Some("fullscreen"),
        }
    }

    /// Encode as the query string appended to the status endpoint
    ///
    /// Returns an empty string for [`EngineCommand::Status`].
    pub fn query_string(&self) -> String {
        let Some(name) = self.name() else {
            return String::new();
        };

        match self {
            EngineCommand::Enqueue { path } => {
                let raw = path.to_string_lossy();
                format!("command={}&input={}", name, urlencoding::encode(&raw))
            }
            EngineCommand::Seek { seconds } => format!("command={}&val={}", name, seconds),
            EngineCommand::Volume { level } => format!("command={}&val={}", name, level),
            _ => format!("command={}", name),
        }
    }
}

impl std::fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineCommand::Status => write!(f, "status"),
            EngineCommand::Enqueue { path } => write!(f, "in_enqueue({})", path.display()),
            EngineCommand::Seek { seconds } => write!(f, "seek({}s)", seconds),
            EngineCommand::Volume { level } => write!(f, "volume({})", level),
            other => write!(f, "{}", other.name().unwrap_or("status")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_empty_query() {
        assert_eq!(EngineCommand::Status.query_string(), "");
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(EngineCommand::PlaylistEmpty.query_string(), "command=pl_empty");
        assert_eq!(EngineCommand::Play.query_string(), "command=pl_play");
        assert_eq!(EngineCommand::Pause.query_string(), "command=pl_forcepause");
        assert_eq!(EngineCommand::Resume.query_string(), "command=pl_forceresume");
        assert_eq!(EngineCommand::Stop.query_string(), "command=pl_stop");
    }

    #[test]
    fn test_numeric_parameters() {
        assert_eq!(
            EngineCommand::Seek { seconds: 0 }.query_string(),
            "command=seek&val=0"
        );
        assert_eq!(
            EngineCommand::Volume { level: 256 }.query_string(),
            "command=volume&val=256"
        );
    }

    #[test]
    fn test_enqueue_encodes_only_the_path() {
        let cmd = EngineCommand::Enqueue {
            path: PathBuf::from("/videos/a&b=c d.mp4"),
        };
        let query = cmd.query_string();

        assert!(query.starts_with("command=in_enqueue&input="));
        let encoded = query.trim_start_matches("command=in_enqueue&input=");
        assert!(!encoded.contains('&'));
        assert!(!encoded.contains('='));
        assert!(!encoded.contains(' '));
        assert_eq!(
            urlencoding::decode(encoded).unwrap(),
            "/videos/a&b=c d.mp4"
        );
        // Exactly one separator between keyword and parameter
        assert_eq!(query.matches('&').count(), 1);
    }
}
