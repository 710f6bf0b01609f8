//! In-process playback engine double
//!
//! Applies commands to a small state machine that behaves like the real
//! engine's HTTP interface, and records each command with the (tokio) time
//! it was received so tests can assert on ordering and spacing.

use async_trait::async_trait;
use kjc_controller::engine::{EngineCommand, EngineControl, EngineRole, EngineStatus, PlayState};
use kjc_controller::{Error, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Misbehavior the mock can be told to exhibit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Behave normally
    None,
    /// Every command fails with a transport error
    Unreachable,
    /// Pause commands are accepted but have no effect
    IgnorePause,
    /// Play commands are accepted but the engine stays stopped
    IgnorePlay,
}

#[derive(Debug)]
struct MockState {
    status: EngineStatus,
    playlist: Option<PathBuf>,
    failure: MockFailure,
    /// Time each command takes to answer
    latency: Duration,
    log: Vec<(Instant, EngineCommand)>,
}

pub struct MockEngine {
    role: EngineRole,
    inner: Mutex<MockState>,
}

impl MockEngine {
    pub fn new(role: EngineRole) -> Self {
        Self {
            role,
            inner: Mutex::new(MockState {
                status: EngineStatus {
                    state: PlayState::Stopped,
                    time: 0,
                    length: 0,
                    volume: 0,
                    fullscreen: false,
                },
                playlist: None,
                failure: MockFailure::None,
                latency: Duration::ZERO,
                log: Vec::new(),
            }),
        }
    }

    /// Background engine already playing a long track at `volume`
    pub fn playing(role: EngineRole, volume: u16) -> Self {
        let engine = Self::new(role);
        {
            let mut inner = engine.inner.lock().unwrap();
            inner.status.state = PlayState::Playing;
            inner.status.length = 600;
            inner.status.time = 42;
            inner.status.volume = volume;
            inner.playlist = Some(PathBuf::from("/music/filler.mp3"));
        }
        engine
    }

    /// Make every command take `latency` to answer; commands are logged on arrival
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().unwrap().latency = latency;
    }

    pub fn set_failure(&self, failure: MockFailure) {
        self.inner.lock().unwrap().failure = failure;
    }

    /// Force the reported state, as if the engine changed on its own
    pub fn set_state(&self, state: PlayState) {
        self.inner.lock().unwrap().status.state = state;
    }

    pub fn set_position(&self, time: u64, length: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.status.time = time;
        inner.status.length = length;
    }

    pub fn status(&self) -> EngineStatus {
        self.inner.lock().unwrap().status.clone()
    }

    pub fn playlist(&self) -> Option<PathBuf> {
        self.inner.lock().unwrap().playlist.clone()
    }

    /// Every command received, status queries included
    pub fn log(&self) -> Vec<(Instant, EngineCommand)> {
        self.inner.lock().unwrap().log.clone()
    }

    /// Commands received, status queries excluded
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.log()
            .into_iter()
            .map(|(_, c)| c)
            .filter(|c| *c != EngineCommand::Status)
            .collect()
    }

    /// Time of the first command equal to `command`
    pub fn first_time_of(&self, command: &EngineCommand) -> Option<Instant> {
        self.log()
            .into_iter()
            .find(|(_, c)| c == command)
            .map(|(t, _)| t)
    }

    /// Levels of all volume commands, in order
    pub fn volume_levels(&self) -> Vec<u16> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                EngineCommand::Volume { level } => Some(level),
                _ => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.inner.lock().unwrap().log.clear();
    }
}

#[async_trait]
impl EngineControl for MockEngine {
    fn role(&self) -> EngineRole {
        self.role
    }

    async fn send(&self, command: EngineCommand) -> Result<EngineStatus> {
        let latency = {
            let mut inner = self.inner.lock().unwrap();
            inner.log.push((Instant::now(), command.clone()));
            inner.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;

        let failure = inner.failure;
        if failure == MockFailure::Unreachable {
            return Err(Error::Transport {
                role: self.role,
                cause: "connection refused".to_string(),
            });
        }

        let status = &mut inner.status;
        match command {
            EngineCommand::Status => {}
            EngineCommand::PlaylistEmpty => {
                status.state = PlayState::Stopped;
                status.time = 0;
                status.length = 0;
                inner.playlist = None;
            }
            EngineCommand::Enqueue { path } => {
                status.length = 240;
                inner.playlist = Some(path);
            }
            EngineCommand::Play => {
                if failure != MockFailure::IgnorePlay && inner.playlist.is_some() {
                    status.state = PlayState::Playing;
                }
            }
            EngineCommand::Pause => {
                if failure != MockFailure::IgnorePause && status.state == PlayState::Playing {
                    status.state = PlayState::Paused;
                }
            }
            EngineCommand::Resume => {
                if status.state == PlayState::Paused {
                    status.state = PlayState::Playing;
                }
            }
            EngineCommand::TogglePause => {
                status.state = match status.state {
                    PlayState::Playing => PlayState::Paused,
                    PlayState::Paused => PlayState::Playing,
                    PlayState::Stopped => PlayState::Stopped,
                };
            }
            EngineCommand::Stop => {
                status.state = PlayState::Stopped;
                status.time = 0;
            }
            EngineCommand::Seek { seconds } => status.time = seconds,
            EngineCommand::Volume { level } => status.volume = level,
            EngineCommand::ToggleFullscreen => status.fullscreen = !status.fullscreen,
        }

        Ok(inner.status.clone())
    }
}
