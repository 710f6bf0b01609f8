//! Play request coordination and playback monitoring

pub mod coordinator;
pub mod monitor;
pub mod session;

pub use coordinator::{Coordinator, PlayOutcome, StatusReport};
pub use monitor::{MonitorTick, PlaybackMonitor};
pub use session::{CoordinatorPhase, PlaybackSession};
