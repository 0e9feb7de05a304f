//! Mental-challenge verification.
//!
//! The user solves a fixed number of sub-tasks per round. Task kinds are
//! shuffled once per round and cycled; each item comes from the session's
//! [`ChallengeContentSource`]. Answer comparison is case-insensitive with
//! whitespace collapsed to single spaces. A wrong answer keeps the same
//! sub-task -- a miss must not buy a fresh (possibly easier) item.

use std::sync::{Arc, Mutex};

use rand::seq::SliceRandom;

use crate::content::{ChallengeContentSource, ChallengeItem, ChallengeKind};
use crate::error::SensorError;
use crate::profile::VerificationMethod;
use crate::sensors::SensorSignal;

use super::{FallbackGate, StrategyEvent, StrategyProgress, VerificationStrategy};

/// Sub-tasks to solve per round.
pub const SUB_TASKS_PER_ROUND: u32 = 3;

/// Solve-to-verify strategy.
pub struct MentalChallengeStrategy {
    source: Arc<Mutex<ChallengeContentSource>>,
    sequence: Vec<ChallengeKind>,
    item: Option<ChallengeItem>,
    solved: u32,
    target: u32,
    completed: bool,
    gate: FallbackGate,
}

impl MentalChallengeStrategy {
    pub fn new(source: Arc<Mutex<ChallengeContentSource>>) -> Self {
        Self {
            source,
            sequence: Vec::new(),
            item: None,
            solved: 0,
            target: 0,
            completed: false,
            gate: FallbackGate::default(),
        }
    }

    /// The sub-task currently awaiting an answer.
    pub fn current_item(&self) -> Option<&ChallengeItem> {
        self.item.as_ref()
    }

    fn issue_next(&mut self, out: &mut Vec<StrategyEvent>) {
        let kind = self.sequence[self.solved as usize % self.sequence.len()];
        let item = self
            .source
            .lock()
            .expect("content source lock")
            .request_challenge(kind);
        out.push(StrategyEvent::Challenge {
            kind: item.kind,
            prompt: item.prompt.clone(),
        });
        self.item = Some(item);
    }
}

/// Collapse case and whitespace for answer comparison.
fn normalize(answer: &str) -> String {
    answer
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl VerificationStrategy for MentalChallengeStrategy {
    fn method(&self) -> VerificationMethod {
        VerificationMethod::Mental
    }

    fn arm(&mut self, target: u32, _now_ms: u64) -> Result<Vec<StrategyEvent>, SensorError> {
        self.target = target;
        self.solved = 0;
        self.completed = false;
        self.gate.disarm();

        let mut sequence = ChallengeKind::ALL.to_vec();
        sequence.shuffle(&mut rand::thread_rng());
        self.sequence = sequence;

        let mut out = vec![StrategyEvent::Progress {
            current: 0,
            target,
        }];
        self.issue_next(&mut out);
        Ok(out)
    }

    fn progress(&self) -> StrategyProgress {
        StrategyProgress::new(self.solved, self.target, self.completed)
    }

    fn is_available(&self) -> bool {
        // The content source never fails; there is no sensing to lose.
        true
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
            SensorSignal::Answer { text } => {
                let Some(item) = self.item.as_ref() else {
                    return Ok(out);
                };
                if normalize(text) == normalize(&item.expected_answer) {
                    self.solved += 1;
                    out.push(StrategyEvent::Progress {
                        current: self.solved,
                        target: self.target,
                    });
                    if self.solved >= self.target {
                        self.completed = true;
                        self.item = None;
                        out.push(StrategyEvent::Completed);
                    } else {
                        self.issue_next(&mut out);
                    }
                } else {
                    out.push(StrategyEvent::AnswerRejected);
                }
            }
            SensorSignal::ManualConfirm => {
                if self.gate.is_open(now_ms) {
                    self.completed = true;
                    self.item = None;
                    out.push(StrategyEvent::Completed);
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
        self.gate.arm(now_ms);
        Vec::new()
    }

    fn teardown(&mut self) {
        self.gate.disarm();
        self.item = None;
        self.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed() -> MentalChallengeStrategy {
        let source = Arc::new(Mutex::new(ChallengeContentSource::local_only()));
        let mut strategy = MentalChallengeStrategy::new(source);
        strategy.arm(SUB_TASKS_PER_ROUND, 0).unwrap();
        strategy
    }

    fn answer(strategy: &mut MentalChallengeStrategy, text: &str) -> Vec<StrategyEvent> {
        strategy
            .deliver(
                &SensorSignal::Answer {
                    text: text.to_string(),
                },
                0,
            )
            .unwrap()
    }

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize("  Cold   WATER wakes "), "cold water wakes");
        assert_eq!(normalize("43"), "43");
    }

    #[test]
    fn arm_shuffles_once_and_issues_first_item() {
        let strategy = armed();
        assert_eq!(strategy.sequence.len(), 3);
        assert!(strategy.current_item().is_some());
        assert_eq!(strategy.progress().target, SUB_TASKS_PER_ROUND);
    }

    #[test]
    fn correct_answers_advance_through_all_sub_tasks() {
        let mut strategy = armed();
        for n in 1..=SUB_TASKS_PER_ROUND {
            let expected = strategy.current_item().unwrap().expected_answer.clone();
            let events = answer(&mut strategy, &expected);
            assert!(events.contains(&StrategyEvent::Progress {
                current: n,
                target: SUB_TASKS_PER_ROUND
            }));
        }
        assert!(strategy.progress().completed);
        assert!(strategy.current_item().is_none());
    }

    #[test]
    fn sloppy_casing_and_spacing_still_match() {
        let mut strategy = armed();
        let expected = strategy.current_item().unwrap().expected_answer.clone();
        let sloppy = format!("  {}  ", expected.to_uppercase());
        let events = answer(&mut strategy, &sloppy);
        assert_eq!(strategy.progress().current, 1);
        assert!(!events.contains(&StrategyEvent::AnswerRejected));
    }

    #[test]
    fn wrong_answer_keeps_the_same_sub_task() {
        let mut strategy = armed();
        let before = strategy.current_item().unwrap().clone();
        let events = answer(&mut strategy, "definitely wrong");
        assert_eq!(events, vec![StrategyEvent::AnswerRejected]);
        assert_eq!(strategy.current_item().unwrap(), &before);
        assert_eq!(strategy.progress().current, 0);
    }

    #[test]
    fn answers_after_completion_are_ignored() {
        let mut strategy = armed();
        for _ in 0..SUB_TASKS_PER_ROUND {
            let expected = strategy.current_item().unwrap().expected_answer.clone();
            answer(&mut strategy, &expected);
        }
        assert!(answer(&mut strategy, "anything").is_empty());
    }
}
