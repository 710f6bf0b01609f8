//! Bootstrap configuration loaded from TOML
//!
//! Lookup order for the config file:
//! 1. Explicit path (command line or `KJC_CONFIG`)
//! 2. `~/.config/kjc/config.toml`
//! 3. `/etc/kjc/config.toml`
//!
//! A missing file is not an error: the service starts on built-in defaults
//! and logs a warning. Every key is optional.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level bootstrap configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding downloaded videos (`~` is expanded)
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,

    /// File extension of stored videos
    #[serde(default = "default_video_extension")]
    pub video_extension: String,

    /// Foreground (karaoke) engine endpoint
    #[serde(default = "EngineEndpointConfig::master_default")]
    pub master: EngineEndpointConfig,

    /// Background (filler music) engine endpoint
    #[serde(default = "EngineEndpointConfig::background_default")]
    pub background: EngineEndpointConfig,

    /// Timing budget of the coordination sequence
    #[serde(default)]
    pub timing: TimingConfig,

    /// Background track behaviour
    #[serde(default)]
    pub background_track: BackgroundTrackConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network endpoint and credential of one playback engine
#[derive(Debug, Clone, Deserialize)]
pub struct EngineEndpointConfig {
    #[serde(default = "default_engine_host")]
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub password: String,
    /// Target volume on the engine's 0-256 scale
    #[serde(default = "default_volume")]
    pub volume: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl EngineEndpointConfig {
    fn master_default() -> Self {
        Self {
            host: default_engine_host(),
            port: 8080,
            password: "karaoke".to_string(),
            volume: default_volume(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    fn background_default() -> Self {
        Self {
            host: default_engine_host(),
            port: 8081,
            password: "filler".to_string(),
            volume: default_volume(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// Base URL of the engine's HTTP interface
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Timing budget of the preload-and-trigger sequence
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of one background fade
    pub fade_duration_ms: u64,
    /// Volume-set commands per fade, independent of duration
    pub fade_steps: u32,
    /// Wait after starting a duck before touching the master engine
    pub duck_settle_ms: u64,
    /// Wait between play-then-pause and the paused-state check
    pub preload_settle_ms: u64,
    /// Upper bound on the readiness rendezvous
    pub rendezvous_timeout_ms: u64,
    /// Playback monitor polling interval
    pub monitor_interval_ms: u64,
    /// Initial signed sync offset
    pub sync_offset_ms: i64,
    /// Largest accepted |sync offset|
    pub max_abs_offset_ms: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_duration_ms: 3000,
            fade_steps: 20,
            duck_settle_ms: 3500,
            preload_settle_ms: 500,
            rendezvous_timeout_ms: 10_000,
            monitor_interval_ms: 1000,
            sync_offset_ms: 0,
            max_abs_offset_ms: 10_000,
        }
    }
}

/// Background track behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackgroundTrackConfig {
    /// Seek to a random position before each fade-in
    pub randomize_start: bool,
    /// Seconds kept clear of the end of the track when randomizing
    pub tail_guard_s: u64,
}

impl Default for BackgroundTrackConfig {
    fn default() -> Self {
        Self {
            randomize_start: true,
            tail_guard_s: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path; console only when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_video_dir() -> PathBuf {
    PathBuf::from("~/kjdata/videos")
}

fn default_video_extension() -> String {
    "mp4".to_string()
}

fn default_engine_host() -> String {
    "127.0.0.1".to_string()
}

fn default_volume() -> u16 {
    256
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            video_dir: default_video_dir(),
            video_extension: default_video_extension(),
            master: EngineEndpointConfig::master_default(),
            background: EngineEndpointConfig::background_default(),
            timing: TimingConfig::default(),
            background_track: BackgroundTrackConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Locate and load the config file, falling back to defaults if none exists
    ///
    /// Returns the path that was read, `None` for built-in defaults. Nothing
    /// is logged here since callers load config before tracing is set up.
    /// An explicit path that does not exist is an error; a missing default
    /// location is not.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => locate_config_file(),
        };

        match path {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> Result<()> {
        for (name, engine) in [("master", &self.master), ("background", &self.background)] {
            if engine.volume > 256 {
                return Err(Error::Config(format!(
                    "{}.volume must be within 0..=256 (got {})",
                    name, engine.volume
                )));
            }
            if engine.request_timeout_ms == 0 {
                return Err(Error::Config(format!(
                    "{}.request_timeout_ms must be positive",
                    name
                )));
            }
        }

        if self.timing.fade_steps == 0 {
            return Err(Error::Config("timing.fade_steps must be positive".to_string()));
        }
        if self.timing.monitor_interval_ms == 0 {
            return Err(Error::Config(
                "timing.monitor_interval_ms must be positive".to_string(),
            ));
        }
        if self.timing.max_abs_offset_ms < 0 {
            return Err(Error::Config(
                "timing.max_abs_offset_ms must not be negative".to_string(),
            ));
        }
        if self.timing.sync_offset_ms.unsigned_abs() > self.timing.max_abs_offset_ms.unsigned_abs() {
            return Err(Error::Config(format!(
                "timing.sync_offset_ms {} exceeds max_abs_offset_ms {}",
                self.timing.sync_offset_ms, self.timing.max_abs_offset_ms
            )));
        }
        Ok(())
    }
}

/// Find the first existing default config file
pub fn locate_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("kjc").join("config.toml"));
    let system_config = PathBuf::from("/etc/kjc/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|p| p.exists())
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
