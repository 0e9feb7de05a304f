//! Verification strategies.
//!
//! A strategy is the pluggable "prove you are awake" task armed for each
//! round. Strategies are caller-driven like the rest of the engine: the
//! round controller pushes sensor signals in and ticks them for their
//! timers (fallback grace, watchdog). A fresh instance is armed per round;
//! teardown clears every pending timer so a stale sample can never mutate a
//! discarded round.

mod fallback;
mod hand_wave;
mod mental;
mod step_count;

pub use fallback::{FallbackGate, FALLBACK_GRACE_MS};
pub use hand_wave::{wave_target, HandWaveStrategy, WavePhase, WAVE_WATCHDOG_MS};
pub use mental::{MentalChallengeStrategy, SUB_TASKS_PER_ROUND};
pub use step_count::{step_target, StepCountStrategy, BASELINE_WINDOW_SECS};

use serde::{Deserialize, Serialize};

use crate::content::ChallengeKind;
use crate::error::SensorError;
use crate::profile::VerificationMethod;
use crate::sensors::SensorSignal;

/// Progress snapshot of the active strategy. Reset each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyProgress {
    pub current: u32,
    pub target: u32,
    pub completed: bool,
}

impl StrategyProgress {
    pub(crate) fn new(current: u32, target: u32, completed: bool) -> Self {
        Self {
            current,
            target,
            completed,
        }
    }
}

/// What a strategy reports back to the round controller.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyEvent {
    /// Measurable progress changed.
    Progress { current: u32, target: u32 },
    /// A mental sub-task was issued.
    Challenge {
        kind: ChallengeKind,
        prompt: String,
    },
    /// A submitted answer did not match the current sub-task.
    AnswerRejected,
    /// The fallback grace period elapsed; manual confirmation now accepted.
    FallbackOffered,
    /// This strategy gives up the round; arm `to` instead.
    Redirect { to: VerificationMethod },
    /// The round target was reached.
    Completed,
}

/// Common contract of all verification strategies.
///
/// Every method takes the current epoch-ms timestamp from the caller so
/// deadline behavior stays deterministic under test. Errors escaping a
/// strategy are caught at the round-controller boundary and treated as
/// `SensorError::Unavailable`, which routes into [`force_fallback`].
///
/// [`force_fallback`]: VerificationStrategy::force_fallback
pub trait VerificationStrategy: Send {
    fn method(&self) -> VerificationMethod;

    /// Arm for a round with `target`. Resets all progress.
    fn arm(&mut self, target: u32, now_ms: u64) -> Result<Vec<StrategyEvent>, SensorError>;

    fn progress(&self) -> StrategyProgress;

    /// Whether the strategy's sensing path is usable.
    fn is_available(&self) -> bool;

    /// Handle a pushed sensor signal. Signals a strategy does not consume
    /// are ignored.
    fn deliver(
        &mut self,
        signal: &SensorSignal,
        now_ms: u64,
    ) -> Result<Vec<StrategyEvent>, SensorError>;

    /// Advance timers (fallback grace, watchdogs).
    fn tick_at(&mut self, now_ms: u64) -> Result<Vec<StrategyEvent>, SensorError>;

    /// Route into the degraded path after an unexpected failure.
    fn force_fallback(&mut self, now_ms: u64) -> Vec<StrategyEvent>;

    /// Clear pending timers and sample routing before the instance is
    /// discarded.
    fn teardown(&mut self);
}
