//! # KJ Controller Library (kjc-controller)
//!
//! Starts karaoke videos on a master media engine and an external display
//! client at the same moment, and keeps a background music engine ducked
//! underneath foreground playback.
//!
//! **Architecture:** Both media engines are driven over their HTTP control
//! interface. The display client receives commands over an SSE push channel
//! and reports readiness back through the HTTP API.

pub mod api;
pub mod audio;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod playback;
pub mod resolver;
pub mod sse;
pub mod state;
pub mod sync;

pub use controller::Controller;
pub use error::{Error, Result};
pub use state::SharedState;
