//! Volume fading and background ducking

pub mod ducking;
pub mod fader;

pub use ducking::{DuckingController, FadeHandle};
pub use fader::{fade_levels, FadeOutcome, VolumeFader};
