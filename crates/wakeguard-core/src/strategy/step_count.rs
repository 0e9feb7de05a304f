//! Step-count verification.
//!
//! The user walks a per-round number of steps. On arm, a short historical
//! window of the step counter establishes a session baseline so steps taken
//! before the task began are not counted; live cumulative readings then
//! normalize against it.

use std::sync::Arc;

use crate::error::SensorError;
use crate::profile::VerificationMethod;
use crate::sensors::{SensorSignal, StepCounter};

use super::{FallbackGate, StrategyEvent, StrategyProgress, VerificationStrategy};

/// Historical window used to baseline a round.
pub const BASELINE_WINDOW_SECS: u64 = 60;

/// Standard per-round step schedule. Targets decrease as the session
/// progresses -- early rounds demand real movement, the final round is a
/// staying-awake check.
pub fn step_target(round: u32) -> u32 {
    match round {
        1 => 30,
        2 => 15,
        3 => 5,
        _ => 30,
    }
}

/// Walk-to-verify strategy.
pub struct StepCountStrategy {
    counter: Arc<dyn StepCounter>,
    baseline: u32,
    current: u32,
    target: u32,
    available: bool,
    completed: bool,
    gate: FallbackGate,
}

impl StepCountStrategy {
    pub fn new(counter: Arc<dyn StepCounter>) -> Self {
        Self {
            counter,
            baseline: 0,
            current: 0,
            target: 0,
            available: false,
            completed: false,
            gate: FallbackGate::default(),
        }
    }

    /// Session baseline established at arm time.
    pub fn baseline(&self) -> u32 {
        self.baseline
    }

    fn complete(&mut self, out: &mut Vec<StrategyEvent>) {
        self.completed = true;
        out.push(StrategyEvent::Completed);
    }
}

impl VerificationStrategy for StepCountStrategy {
    fn method(&self) -> VerificationMethod {
        VerificationMethod::Steps
    }

    fn arm(&mut self, target: u32, now_ms: u64) -> Result<Vec<StrategyEvent>, SensorError> {
        self.target = target;
        self.current = 0;
        self.completed = false;
        self.gate.disarm();

        match self.counter.probe() {
            Ok(()) => {
                // Not all platforms support the historical query; a missing
                // window just means a zero baseline.
                self.baseline = self
                    .counter
                    .steps_in_window(BASELINE_WINDOW_SECS)
                    .unwrap_or(0);
                self.available = true;
                Ok(vec![StrategyEvent::Progress {
                    current: 0,
                    target,
                }])
            }
            Err(_) => {
                self.available = false;
                self.gate.arm(now_ms);
                Ok(Vec::new())
            }
        }
    }

    fn progress(&self) -> StrategyProgress {
        StrategyProgress::new(self.current, self.target, self.completed)
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn deliver(
        &mut self,
        signal: &SensorSignal,
        now_ms: u64,
    ) -> Result<Vec<StrategyEvent>, SensorError> {
        if self.completed {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        match signal {
            SensorSignal::Steps { raw } => {
                let normalized = raw.saturating_sub(self.baseline);
                if normalized != self.current {
                    self.current = normalized;
                    out.push(StrategyEvent::Progress {
                        current: self.current,
                        target: self.target,
                    });
                }
                if self.current >= self.target {
                    self.complete(&mut out);
                }
            }
            SensorSignal::ManualConfirm => {
                if self.gate.is_open(now_ms) {
                    self.complete(&mut out);
                }
            }
            _ => {}
        }
        Ok(out)
    }

    fn tick_at(&mut self, now_ms: u64) -> Result<Vec<StrategyEvent>, SensorError> {
        if !self.completed && self.gate.poll_offer(now_ms) {
            return Ok(vec![StrategyEvent::FallbackOffered]);
        }
        Ok(Vec::new())
    }

    fn force_fallback(&mut self, now_ms: u64) -> Vec<StrategyEvent> {
        self.available = false;
        self.gate.arm(now_ms);
        if self.gate.poll_offer(now_ms) {
            vec![StrategyEvent::FallbackOffered]
        } else {
            Vec::new()
        }
    }

    fn teardown(&mut self) {
        self.gate.disarm();
        self.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ScriptedStepCounter;
    use crate::strategy::FALLBACK_GRACE_MS;

    fn armed(baseline_window: u32, target: u32) -> StepCountStrategy {
        let counter = Arc::new(ScriptedStepCounter::available().with_window_steps(baseline_window));
        let mut strategy = StepCountStrategy::new(counter);
        strategy.arm(target, 0).unwrap();
        strategy
    }

    #[test]
    fn completes_exactly_at_baseline_plus_target() {
        let mut strategy = armed(12, 30);
        assert_eq!(strategy.baseline(), 12);

        let events = strategy
            .deliver(&SensorSignal::Steps { raw: 41 }, 100)
            .unwrap();
        assert!(!strategy.progress().completed);
        assert!(!events.contains(&StrategyEvent::Completed));

        let events = strategy
            .deliver(&SensorSignal::Steps { raw: 42 }, 200)
            .unwrap();
        assert!(strategy.progress().completed);
        assert!(events.contains(&StrategyEvent::Completed));
    }

    #[test]
    fn readings_below_baseline_normalize_to_zero() {
        let mut strategy = armed(12, 30);
        strategy.deliver(&SensorSignal::Steps { raw: 7 }, 100).unwrap();
        assert_eq!(strategy.progress().current, 0);
    }

    #[test]
    fn unavailable_sensor_arms_the_grace_gate() {
        let counter = Arc::new(ScriptedStepCounter::unavailable(SensorError::Unavailable));
        let mut strategy = StepCountStrategy::new(counter);
        strategy.arm(30, 0).unwrap();
        assert!(!strategy.is_available());

        // Confirmation before the gate opens is ignored.
        let events = strategy.deliver(&SensorSignal::ManualConfirm, 1_000).unwrap();
        assert!(events.is_empty());
        assert!(!strategy.progress().completed);

        let events = strategy.tick_at(FALLBACK_GRACE_MS).unwrap();
        assert_eq!(events, vec![StrategyEvent::FallbackOffered]);

        let events = strategy
            .deliver(&SensorSignal::ManualConfirm, FALLBACK_GRACE_MS + 1)
            .unwrap();
        assert!(events.contains(&StrategyEvent::Completed));
    }

    #[test]
    fn permission_denied_takes_the_same_path() {
        let counter = Arc::new(ScriptedStepCounter::unavailable(
            SensorError::PermissionDenied,
        ));
        let mut strategy = StepCountStrategy::new(counter);
        strategy.arm(30, 0).unwrap();
        assert!(!strategy.is_available());
        assert!(strategy.tick_at(FALLBACK_GRACE_MS).unwrap().len() == 1);
    }

    #[test]
    fn manual_confirm_with_healthy_sensor_is_ignored() {
        let mut strategy = armed(0, 30);
        let events = strategy
            .deliver(&SensorSignal::ManualConfirm, 60_000)
            .unwrap();
        assert!(events.is_empty());
        assert!(!strategy.progress().completed);
    }

    #[test]
    fn steps_after_completion_are_ignored() {
        let mut strategy = armed(0, 5);
        strategy.deliver(&SensorSignal::Steps { raw: 5 }, 0).unwrap();
        assert!(strategy.progress().completed);
        let events = strategy
            .deliver(&SensorSignal::Steps { raw: 50 }, 100)
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(strategy.progress().current, 5);
    }
}
