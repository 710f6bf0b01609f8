//! Volume fader
//!
//! Ramps an engine's volume linearly by issuing one volume command per step.
//! The step count is fixed, so a short fade is as smooth as a long one, and
//! the last step always lands exactly on the target level.
//!
//! At most one fade runs per engine role. Starting a fade cancels the one
//! already in flight for that role, so two ramps never interleave their
//! volume commands.

use crate::engine::{EngineCommand, EngineControl, EngineRole};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How a fade ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// All steps were issued
    Completed,
    /// A newer fade for the same role took over
    Cancelled,
}

/// Intermediate volume levels of a linear fade, excluding `from`
///
/// Always `steps` entries; the last one is exactly `to`.
pub fn fade_levels(from: u16, to: u16, steps: u32) -> Vec<u16> {
    let steps = steps.max(1) as i64;
    let from = from as i64;
    let span = to as i64 - from;

    (1..=steps)
        .map(|i| (from + span * i / steps) as u16)
        .collect()
}

/// Linear volume fader with one cancellable fade slot per engine role
#[derive(Clone)]
pub struct VolumeFader {
    steps: u32,
    slots: Arc<Mutex<HashMap<EngineRole, CancellationToken>>>,
}

impl VolumeFader {
    pub fn new(steps: u32) -> Self {
        Self {
            steps: steps.max(1),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Claim the fade slot for `role`, cancelling whatever held it
    pub fn begin(&self, role: EngineRole) -> CancellationToken {
        let token = CancellationToken::new();
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slots.insert(role, token.clone()) {
            if !previous.is_cancelled() {
                debug!(%role, "Superseding in-flight fade");
            }
            previous.cancel();
        }
        token
    }

    /// Cancel the in-flight fade for `role`, if any
    pub fn cancel(&self, role: EngineRole) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = slots.remove(&role) {
            token.cancel();
        }
    }

    /// Run a fade on the current task
    ///
    /// Blocks for `duration`, issuing one volume command every
    /// `duration / steps`. Returns early with [`FadeOutcome::Cancelled`]
    /// when `token` is cancelled, or with an error when a volume command
    /// fails.
    pub async fn fade(
        &self,
        engine: &dyn EngineControl,
        from: u16,
        to: u16,
        duration: Duration,
        token: &CancellationToken,
    ) -> Result<FadeOutcome> {
        let interval = duration / self.steps;
        debug!(
            role = %engine.role(),
            from,
            to,
            duration_ms = duration.as_millis() as u64,
            steps = self.steps,
            "Starting volume fade"
        );

        for level in fade_levels(from, to, self.steps) {
            tokio::select! {
                _ = token.cancelled() => return Ok(FadeOutcome::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }
            if token.is_cancelled() {
                return Ok(FadeOutcome::Cancelled);
            }
            engine.send(EngineCommand::Volume { level }).await?;
        }

        Ok(FadeOutcome::Completed)
    }

    /// Claim the slot for the engine's role and run the fade on its own task
    pub fn spawn_fade(
        &self,
        engine: Arc<dyn EngineControl>,
        from: u16,
        to: u16,
        duration: Duration,
    ) -> JoinHandle<Result<FadeOutcome>> {
        let token = self.begin(engine.role());
        let fader = self.clone();

        tokio::spawn(async move {
            let result = fader.fade(engine.as_ref(), from, to, duration, &token).await;
            if let Err(e) = &result {
                warn!(role = %engine.role(), "Volume fade aborted: {}", e);
            }
            result
        })
    }
}
