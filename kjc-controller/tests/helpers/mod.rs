//! Test helper modules for kjc-controller integration tests
//!
//! Provides reusable test infrastructure components:
//! - MockEngine: in-process playback engine that records every command
//! - RecordingPush: push channel that records every client event
//! - Harness: coordinator, monitor and ducking wired around the mocks

#![allow(dead_code)]

pub mod harness;
pub mod mock_engine;
pub mod recording_push;

pub use harness::{Harness, TEST_FADE_STEPS};
pub use mock_engine::{MockEngine, MockFailure};
pub use recording_push::RecordingPush;
