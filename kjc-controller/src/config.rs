//! kjc-controller configuration
//!
//! Bootstrap settings come from the shared TOML file (see
//! `kjc_common::config`); command-line arguments and environment variables
//! override the few keys an operator changes per launch.

use kjc_common::config::{
    expand_home, BackgroundTrackConfig, EngineEndpointConfig, LoggingConfig, TimingConfig,
    TomlConfig,
};
use std::path::PathBuf;
use std::time::Duration;

/// Values given on the command line (or via env), highest priority
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub video_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Timing budget as durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub fade_duration: Duration,
    pub duck_settle: Duration,
    pub preload_settle: Duration,
    pub rendezvous_timeout: Duration,
    pub monitor_interval: Duration,
}

impl From<&TimingConfig> for Timings {
    fn from(t: &TimingConfig) -> Self {
        Self {
            fade_duration: Duration::from_millis(t.fade_duration_ms),
            duck_settle: Duration::from_millis(t.duck_settle_ms),
            preload_settle: Duration::from_millis(t.preload_settle_ms),
            rendezvous_timeout: Duration::from_millis(t.rendezvous_timeout_ms),
            monitor_interval: Duration::from_millis(t.monitor_interval_ms),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

/// Resolved controller configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub video_dir: PathBuf,
    pub video_extension: String,
    pub master: EngineEndpointConfig,
    pub background: EngineEndpointConfig,
    pub timing: TimingConfig,
    pub background_track: BackgroundTrackConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Merge the TOML file with command-line overrides
    pub fn resolve(toml: TomlConfig, overrides: Overrides) -> Self {
        let mut logging = toml.logging;
        if let Some(level) = overrides.log_level {
            logging.level = level;
        }
        logging.file = logging.file.map(|f| expand_home(&f));

        let video_dir = overrides.video_dir.unwrap_or(toml.video_dir);

        Self {
            port: overrides.port.unwrap_or(toml.port),
            video_dir: expand_home(&video_dir),
            video_extension: toml.video_extension,
            master: toml.master,
            background: toml.background,
            timing: toml.timing,
            background_track: toml.background_track,
            logging,
        }
    }

    pub fn timings(&self) -> Timings {
        Timings::from(&self.timing)
    }
}
