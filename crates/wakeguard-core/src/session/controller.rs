//! Round progression.
//!
//! `RoundController` owns one wake session and drives it through the round
//! state machine:
//!
//! ```text
//! Scheduled -> Ringing(n) -> Verifying(n) -> Cooldown(n) -> Ringing(n+1)
//!                                 |
//!                                 +-- n == target_rounds -> Completed
//! ```
//!
//! Like the rest of the engine it is caller-driven: no internal threads.
//! Hosts call `tick()` periodically and push sensor readings through
//! `deliver()`. The cooldown between rounds is an absolute deadline
//! timestamp compared against current time on every tick, so a host
//! suspend/resume never under-counts elapsed real time.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alarm::{AlarmSignalController, DUCK_LEVEL};
use crate::content::ChallengeContentSource;
use crate::events::Event;
use crate::profile::{PersonalityProfile, SoundProfile, VerificationMethod};
use crate::sensors::{MotionSignalSource, SensorSignal, StepCounter};
use crate::strategy::{
    step_target, wave_target, HandWaveStrategy, MentalChallengeStrategy, StepCountStrategy,
    StrategyEvent, StrategyProgress, VerificationStrategy, SUB_TASKS_PER_ROUND,
};
use crate::trigger::{DemoOverrides, WakeTrigger};

/// Consecutive verified rounds required to release the alarm.
pub const TARGET_ROUNDS: u32 = 3;

/// Session-level state. Exactly one is active; `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundState {
    /// Trigger armed, alarm not yet fired.
    Scheduled,
    /// Alarm signal at full level, awaiting acknowledgement.
    Ringing,
    /// Signal ducked, verification strategy active.
    Verifying,
    /// Round verified; silent countdown to the next ring.
    Cooldown,
    /// Every round verified; signal released.
    Completed,
}

/// One wake session. Created when a trigger fires, owned exclusively by
/// [`RoundController`], dropped on completion or abandonment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeSession {
    pub id: Uuid,
    pub target_rounds: u32,
    pub current_round: u32,
    pub verification_method: VerificationMethod,
    pub personality: PersonalityProfile,
    pub sound: SoundProfile,
    pub cooldown_seconds: u64,
    pub user_name: String,
    pub reason: String,
    pub started_at: chrono::DateTime<Utc>,
    pub demo_overrides: Option<DemoOverrides>,
}

impl WakeSession {
    /// Build a session from the durable trigger payload.
    pub fn from_trigger(trigger: &WakeTrigger) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_rounds: TARGET_ROUNDS,
            current_round: trigger.round.max(1),
            verification_method: trigger.verification_method,
            personality: trigger.personality,
            sound: trigger.sound,
            cooldown_seconds: trigger.cooldown_seconds,
            user_name: trigger.user_name.clone(),
            reason: trigger.reason.clone(),
            started_at: Utc::now(),
            demo_overrides: trigger.demo_overrides.clone(),
        }
    }
}

/// Top-level orchestrator: composes the alarm signal controller and the
/// active verification strategy across rounds.
pub struct RoundController {
    session: WakeSession,
    state: RoundState,
    alarm: AlarmSignalController,
    strategy: Option<Box<dyn VerificationStrategy>>,
    /// Method actually armed this round; differs from the session's choice
    /// after a hand-wave redirect.
    active_method: VerificationMethod,
    steps: Arc<dyn StepCounter>,
    motion: Arc<dyn MotionSignalSource>,
    content: Arc<Mutex<ChallengeContentSource>>,
    cooldown_deadline_ms: Option<u64>,
}

impl RoundController {
    pub fn new(
        trigger: &WakeTrigger,
        alarm: AlarmSignalController,
        steps: Arc<dyn StepCounter>,
        motion: Arc<dyn MotionSignalSource>,
        content: Arc<Mutex<ChallengeContentSource>>,
    ) -> Self {
        let session = WakeSession::from_trigger(trigger);
        let active_method = session.verification_method;
        Self {
            session,
            state: RoundState::Scheduled,
            alarm,
            strategy: None,
            active_method,
            steps,
            motion,
            content,
            cooldown_deadline_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn session(&self) -> &WakeSession {
        &self.session
    }

    pub fn current_round(&self) -> u32 {
        self.session.current_round
    }

    /// Progress of the active strategy, while verifying.
    pub fn progress(&self) -> Option<StrategyProgress> {
        self.strategy.as_ref().map(|s| s.progress())
    }

    /// Method armed for the current round, while verifying.
    pub fn active_method(&self) -> Option<VerificationMethod> {
        self.strategy.as_ref().map(|_| self.active_method)
    }

    /// Absolute cooldown deadline, while cooling down.
    pub fn cooldown_deadline_ms(&self) -> Option<u64> {
        self.cooldown_deadline_ms
    }

    pub fn alarm(&self) -> &AlarmSignalController {
        &self.alarm
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// The trigger fired: enter the first ring phase.
    pub fn begin(&mut self) -> Vec<Event> {
        self.begin_at(now_ms())
    }

    pub fn begin_at(&mut self, now_ms: u64) -> Vec<Event> {
        if self.state != RoundState::Scheduled {
            return Vec::new();
        }
        self.state = RoundState::Ringing;
        let mut out = vec![
            Event::SessionStarted {
                session_id: self.session.id,
                round: self.session.current_round,
                at: Utc::now(),
            },
            Event::RingStarted {
                round: self.session.current_round,
                at: Utc::now(),
            },
        ];
        out.extend(self.alarm.start(self.session.sound, now_ms));
        out
    }

    /// The user acknowledged the ring: duck the signal and arm the round's
    /// strategy. Valid only while ringing.
    pub fn acknowledge(&mut self) -> Vec<Event> {
        self.acknowledge_at(now_ms())
    }

    pub fn acknowledge_at(&mut self, now_ms: u64) -> Vec<Event> {
        if self.state != RoundState::Ringing {
            return Vec::new();
        }
        self.state = RoundState::Verifying;

        // Duck and arm inside one call: no observable window of full
        // volume with an active task.
        let mut out = self.alarm.duck(DUCK_LEVEL, now_ms);
        let method = self.session.verification_method;
        out.extend(self.arm_strategy(method, now_ms));
        out
    }

    /// Push a sensor reading. Routed to the active strategy only while
    /// verifying; dropped otherwise.
    pub fn deliver(&mut self, signal: &SensorSignal) -> Vec<Event> {
        self.deliver_at(signal, now_ms())
    }

    pub fn deliver_at(&mut self, signal: &SensorSignal, now_ms: u64) -> Vec<Event> {
        if self.state != RoundState::Verifying {
            return Vec::new();
        }
        let strategy_events = match self.strategy.as_mut() {
            Some(strategy) => match strategy.deliver(signal, now_ms) {
                Ok(events) => events,
                // Unexpected strategy failure: treat as sensor loss and
                // route to the fallback path, never surface.
                Err(_) => strategy.force_fallback(now_ms),
            },
            None => return Vec::new(),
        };
        self.apply_strategy_events(strategy_events, now_ms)
    }

    /// Advance timers: speech cadence, strategy watchdogs, cooldown expiry.
    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut out = self.alarm.tick_at(now_ms);
        match self.state {
            RoundState::Verifying => {
                let strategy_events = match self.strategy.as_mut() {
                    Some(strategy) => match strategy.tick_at(now_ms) {
                        Ok(events) => events,
                        Err(_) => strategy.force_fallback(now_ms),
                    },
                    None => Vec::new(),
                };
                out.extend(self.apply_strategy_events(strategy_events, now_ms));
            }
            RoundState::Cooldown => {
                if self.cooldown_deadline_ms.is_some_and(|d| now_ms >= d) {
                    self.cooldown_deadline_ms = None;
                    self.session.current_round += 1;
                    self.state = RoundState::Ringing;
                    out.push(Event::RingStarted {
                        round: self.session.current_round,
                        at: Utc::now(),
                    });
                    out.extend(self.alarm.start(self.session.sound, now_ms));
                }
            }
            _ => {}
        }
        out
    }

    /// Abandon the session: tear down the strategy, stop the signal, and
    /// consume the controller. Pending timers die with it; a stale sample
    /// has nothing left to mutate.
    pub fn abandon(mut self) -> Vec<Event> {
        if let Some(mut strategy) = self.strategy.take() {
            strategy.teardown();
        }
        let mut out = self.alarm.stop();
        out.push(Event::SessionAbandoned {
            session_id: self.session.id,
            state: self.state,
            round: self.session.current_round,
            at: Utc::now(),
        });
        out
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm_strategy(&mut self, method: VerificationMethod, now_ms: u64) -> Vec<Event> {
        self.active_method = method;
        let round = self.session.current_round;
        let target = self.target_for(method, round);

        let mut strategy = self.build_strategy(method);
        let arm_events = match strategy.arm(target, now_ms) {
            Ok(events) => events,
            Err(_) => strategy.force_fallback(now_ms),
        };
        self.strategy = Some(strategy);

        let mut out = vec![Event::VerifyingStarted {
            round,
            method,
            target,
            at: Utc::now(),
        }];
        out.extend(self.apply_strategy_events(arm_events, now_ms));
        out
    }

    fn build_strategy(&self, method: VerificationMethod) -> Box<dyn VerificationStrategy> {
        match method {
            VerificationMethod::Steps => {
                Box::new(StepCountStrategy::new(Arc::clone(&self.steps)))
            }
            VerificationMethod::HandWave => {
                Box::new(HandWaveStrategy::new(Arc::clone(&self.motion)))
            }
            VerificationMethod::Mental => {
                Box::new(MentalChallengeStrategy::new(Arc::clone(&self.content)))
            }
        }
    }

    fn target_for(&self, method: VerificationMethod, round: u32) -> u32 {
        let overrides = self.session.demo_overrides.as_ref();
        match method {
            VerificationMethod::Steps => overrides
                .and_then(|o| DemoOverrides::target_for(&o.step_targets, round))
                .unwrap_or_else(|| step_target(round)),
            VerificationMethod::HandWave => overrides
                .and_then(|o| DemoOverrides::target_for(&o.wave_targets, round))
                .unwrap_or_else(|| wave_target(round)),
            VerificationMethod::Mental => SUB_TASKS_PER_ROUND,
        }
    }

    fn apply_strategy_events(
        &mut self,
        strategy_events: Vec<StrategyEvent>,
        now_ms: u64,
    ) -> Vec<Event> {
        let round = self.session.current_round;
        let mut out = Vec::new();
        for event in strategy_events {
            match event {
                StrategyEvent::Progress { current, target } => {
                    out.push(Event::ProgressUpdated {
                        round,
                        current,
                        target,
                        at: Utc::now(),
                    });
                }
                StrategyEvent::Challenge { kind, prompt } => {
                    out.push(Event::ChallengePresented {
                        round,
                        kind,
                        prompt,
                        at: Utc::now(),
                    });
                }
                StrategyEvent::AnswerRejected => {
                    self.alarm.feedback();
                    out.push(Event::AnswerRejected {
                        round,
                        at: Utc::now(),
                    });
                }
                StrategyEvent::FallbackOffered => {
                    out.push(Event::FallbackOffered {
                        round,
                        at: Utc::now(),
                    });
                }
                StrategyEvent::Redirect { to } => {
                    out.push(Event::StrategyRedirected {
                        round,
                        from: self.active_method,
                        to,
                        at: Utc::now(),
                    });
                    if let Some(mut old) = self.strategy.take() {
                        old.teardown();
                    }
                    out.extend(self.arm_strategy(to, now_ms));
                }
                StrategyEvent::Completed => {
                    out.extend(self.complete_round(now_ms));
                }
            }
        }
        out
    }

    /// A round's strategy reported completion. Valid only while verifying.
    fn complete_round(&mut self, now_ms: u64) -> Vec<Event> {
        if self.state != RoundState::Verifying {
            return Vec::new();
        }
        let round = self.session.current_round;
        if let Some(mut strategy) = self.strategy.take() {
            strategy.teardown();
        }

        let mut out = vec![Event::RoundCompleted {
            round,
            at: Utc::now(),
        }];
        out.extend(self.alarm.stop());

        if round >= self.session.target_rounds {
            self.state = RoundState::Completed;
            out.push(Event::SessionCompleted {
                session_id: self.session.id,
                rounds: round,
                at: Utc::now(),
            });
        } else {
            let deadline = now_ms + self.session.cooldown_seconds * 1_000;
            self.cooldown_deadline_ms = Some(deadline);
            self.state = RoundState::Cooldown;
            out.push(Event::CooldownStarted {
                round,
                deadline_epoch_ms: deadline,
                at: Utc::now(),
            });
        }
        out
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
