//! Hand-wave verification.
//!
//! The user waves a hand left-right in front of the camera. The strategy
//! consumes the periodic binary motion signal from a
//! [`MotionSignalSource`](crate::sensors::MotionSignalSource) and runs a
//! four-state machine per wave:
//!
//! ```text
//! WaitLeft -> WaitRight -> WaveCounted -> Cooldown -> WaitLeft
//! ```
//!
//! Motion in `WaitLeft` registers the left sweep; motion in `WaitRight`
//! completes the wave, unless it arrives inside the same-sweep window (a
//! double-fire of one sweep), which debounces back to `WaitLeft` without
//! counting. After a counted wave a short cooldown absorbs residual motion.
//!
//! Camera motion is the least reliable signal in the system, so the failure
//! path differs from the other strategies: a 30-second no-progress watchdog
//! redirects the round to step counting instead of offering manual
//! confirmation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SensorError;
use crate::profile::VerificationMethod;
use crate::sensors::{MotionSignalSource, SensorSignal};

use super::{StrategyEvent, StrategyProgress, VerificationStrategy};

/// No-progress window before the round redirects to steps.
pub const WAVE_WATCHDOG_MS: u64 = 30_000;

/// Residual-motion absorption after a counted wave.
const WAVE_COOLDOWN_MS: u64 = 900;

/// Motion samples closer together than this are one physical sweep.
/// Sits just under the 300 ms sample cadence so normally paced samples
/// always count.
const SAME_SWEEP_MS: u64 = 250;

/// Standard per-round wave schedule.
pub fn wave_target(round: u32) -> u32 {
    match round {
        1 => 5,
        2 => 3,
        3 => 2,
        _ => 5,
    }
}

/// Wave-detection state, one cycle per counted wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WavePhase {
    /// Awaiting the leftward sweep.
    WaitLeft,
    /// Left sweep seen; awaiting the rightward sweep.
    WaitRight,
    /// Wave just counted.
    WaveCounted,
    /// Absorbing residual motion before the next wave.
    Cooldown,
}

/// Wave-to-verify strategy.
pub struct HandWaveStrategy {
    motion: Arc<dyn MotionSignalSource>,
    phase: WavePhase,
    waves: u32,
    target: u32,
    available: bool,
    completed: bool,
    redirected: bool,
    /// When the machine entered `WaitRight`; drives the same-sweep debounce.
    entered_right_at_ms: u64,
    cooldown_until_ms: u64,
    /// Last state progress; drives the watchdog.
    last_progress_ms: u64,
}

impl HandWaveStrategy {
    pub fn new(motion: Arc<dyn MotionSignalSource>) -> Self {
        Self {
            motion,
            phase: WavePhase::WaitLeft,
            waves: 0,
            target: 0,
            available: false,
            completed: false,
            redirected: false,
            entered_right_at_ms: 0,
            cooldown_until_ms: 0,
            last_progress_ms: 0,
        }
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Sample cadence the host should drive the motion source at.
    pub fn sample_interval_ms(&self) -> u64 {
        self.motion.sample_interval_ms()
    }

    fn redirect(&mut self) -> Vec<StrategyEvent> {
        self.redirected = true;
        vec![StrategyEvent::Redirect {
            to: VerificationMethod::Steps,
        }]
    }

    fn on_motion(&mut self, now_ms: u64, out: &mut Vec<StrategyEvent>) {
        match self.phase {
            WavePhase::WaitLeft => {
                self.phase = WavePhase::WaitRight;
                self.entered_right_at_ms = now_ms;
                self.last_progress_ms = now_ms;
            }
            WavePhase::WaitRight => {
                if now_ms.saturating_sub(self.entered_right_at_ms) < SAME_SWEEP_MS {
                    // Same physical sweep reported twice; not a wave.
                    self.phase = WavePhase::WaitLeft;
                    return;
                }
                self.waves += 1;
                self.phase = WavePhase::WaveCounted;
                self.cooldown_until_ms = now_ms + WAVE_COOLDOWN_MS;
                self.last_progress_ms = now_ms;
                out.push(StrategyEvent::Progress {
                    current: self.waves,
                    target: self.target,
                });
                if self.waves >= self.target {
                    self.completed = true;
                    out.push(StrategyEvent::Completed);
                }
            }
            WavePhase::WaveCounted | WavePhase::Cooldown => {
                // Residual motion inside the cooldown is absorbed.
            }
        }
    }
}

impl VerificationStrategy for HandWaveStrategy {
    fn method(&self) -> VerificationMethod {
        VerificationMethod::HandWave
    }

    fn arm(&mut self, target: u32, now_ms: u64) -> Result<Vec<StrategyEvent>, SensorError> {
        self.target = target;
        self.waves = 0;
        self.completed = false;
        self.redirected = false;
        self.phase = WavePhase::WaitLeft;
        self.last_progress_ms = now_ms;

        match self.motion.probe() {
            Ok(()) => {
                self.available = true;
                Ok(vec![StrategyEvent::Progress {
                    current: 0,
                    target,
                }])
            }
            Err(_) => {
                // No camera signal at all: redirect immediately rather than
                // waiting for the watchdog.
                self.available = false;
                Ok(self.redirect())
            }
        }
    }

    fn progress(&self) -> StrategyProgress {
        StrategyProgress::new(self.waves, self.target, self.completed)
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn deliver(
        &mut self,
        signal: &SensorSignal,
        now_ms: u64,
    ) -> Result<Vec<StrategyEvent>, SensorError> {
        if self.completed || self.redirected {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        if let SensorSignal::Motion { detected } = signal {
            // Resolve an elapsed cooldown before interpreting the sample.
            if matches!(self.phase, WavePhase::WaveCounted | WavePhase::Cooldown) {
                if now_ms >= self.cooldown_until_ms {
                    self.phase = WavePhase::WaitLeft;
                } else {
                    self.phase = WavePhase::Cooldown;
                    return Ok(out);
                }
            }
            if *detected {
                self.on_motion(now_ms, &mut out);
            }
        }
        Ok(out)
    }

    fn tick_at(&mut self, now_ms: u64) -> Result<Vec<StrategyEvent>, SensorError> {
        if self.completed || self.redirected {
            return Ok(Vec::new());
        }
        if now_ms.saturating_sub(self.last_progress_ms) >= WAVE_WATCHDOG_MS {
            return Ok(self.redirect());
        }
        Ok(Vec::new())
    }

    fn force_fallback(&mut self, _now_ms: u64) -> Vec<StrategyEvent> {
        self.available = false;
        if self.redirected {
            return Vec::new();
        }
        self.redirect()
    }

    fn teardown(&mut self) {
        self.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ScriptedMotionSource;

    const CADENCE: u64 = 300;

    fn armed(target: u32) -> HandWaveStrategy {
        let motion = Arc::new(ScriptedMotionSource::available());
        let mut strategy = HandWaveStrategy::new(motion);
        strategy.arm(target, 0).unwrap();
        strategy
    }

    fn motion(strategy: &mut HandWaveStrategy, detected: bool, at: u64) -> Vec<StrategyEvent> {
        strategy
            .deliver(&SensorSignal::Motion { detected }, at)
            .unwrap()
    }

    #[test]
    fn left_then_right_counts_one_wave() {
        let mut strategy = armed(5);
        motion(&mut strategy, true, CADENCE);
        assert_eq!(strategy.phase(), WavePhase::WaitRight);
        let events = motion(&mut strategy, true, 2 * CADENCE);
        assert_eq!(strategy.progress().current, 1);
        assert!(events.contains(&StrategyEvent::Progress {
            current: 1,
            target: 5
        }));
        assert_eq!(strategy.phase(), WavePhase::WaveCounted);
    }

    #[test]
    fn double_fire_of_one_sweep_is_debounced() {
        let mut strategy = armed(5);
        motion(&mut strategy, true, 300);
        // Second report of the same sweep, well inside the same-sweep
        // window.
        let events = motion(&mut strategy, true, 400);
        assert!(events.is_empty());
        assert_eq!(strategy.progress().current, 0);
        assert_eq!(strategy.phase(), WavePhase::WaitLeft);
    }

    #[test]
    fn no_motion_samples_do_not_advance_the_machine() {
        let mut strategy = armed(5);
        motion(&mut strategy, false, 300);
        motion(&mut strategy, false, 600);
        assert_eq!(strategy.phase(), WavePhase::WaitLeft);
        motion(&mut strategy, true, 900);
        motion(&mut strategy, false, 1_200);
        // Still awaiting the right sweep.
        assert_eq!(strategy.phase(), WavePhase::WaitRight);
    }

    #[test]
    fn cooldown_absorbs_residual_motion_then_reopens() {
        let mut strategy = armed(5);
        motion(&mut strategy, true, 300);
        motion(&mut strategy, true, 600); // wave 1
        let events = motion(&mut strategy, true, 900); // inside cooldown
        assert!(events.is_empty());
        assert_eq!(strategy.phase(), WavePhase::Cooldown);

        // Past the cooldown the sample is interpreted fresh.
        motion(&mut strategy, true, 600 + 1_000);
        assert_eq!(strategy.phase(), WavePhase::WaitRight);
        motion(&mut strategy, true, 600 + 1_000 + CADENCE);
        assert_eq!(strategy.progress().current, 2);
    }

    #[test]
    fn completes_at_target() {
        let mut strategy = armed(2);
        let mut t = 0;
        for _ in 0..2 {
            t += 1_000; // clear of any cooldown
            motion(&mut strategy, true, t);
            t += CADENCE;
            motion(&mut strategy, true, t);
        }
        assert!(strategy.progress().completed);
    }

    #[test]
    fn watchdog_redirects_to_steps_after_inactivity() {
        let mut strategy = armed(5);
        motion(&mut strategy, true, 300);
        let events = strategy.tick_at(300 + WAVE_WATCHDOG_MS).unwrap();
        assert_eq!(
            events,
            vec![StrategyEvent::Redirect {
                to: VerificationMethod::Steps
            }]
        );
        // Samples after the redirect are dead.
        assert!(motion(&mut strategy, true, 40_000).is_empty());
    }

    #[test]
    fn progress_resets_the_watchdog() {
        let mut strategy = armed(5);
        motion(&mut strategy, true, 300);
        motion(&mut strategy, true, 600); // progress at 600
        let events = strategy.tick_at(600 + WAVE_WATCHDOG_MS - 1).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn missing_camera_redirects_at_arm() {
        let motion = Arc::new(ScriptedMotionSource::unavailable(SensorError::Unavailable));
        let mut strategy = HandWaveStrategy::new(motion);
        let events = strategy.arm(5, 0).unwrap();
        assert_eq!(
            events,
            vec![StrategyEvent::Redirect {
                to: VerificationMethod::Steps
            }]
        );
    }
}
