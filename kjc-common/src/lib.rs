//! # KJ Controller Common Library
//!
//! Shared code for the KJ controller service and its tools:
//! - Error types
//! - Bootstrap configuration (TOML) and config-file lookup
//! - Push-channel event types sent to the external display client
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use events::ClientEvent;
