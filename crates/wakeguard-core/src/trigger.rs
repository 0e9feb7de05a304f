//! Wake triggers and the scheduling boundary.
//!
//! A [`WakeTrigger`] is the parameter bundle assembled during onboarding and
//! handed to the platform scheduler. It is the only durable configuration in
//! the system: when the scheduled notification fires (or the user taps it),
//! the same bundle comes back and resumes the session into its first ring
//! phase. Verification progress itself is never persisted -- a killed and
//! relaunched process starts over at round 1.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::profile::{PersonalityProfile, SoundProfile, VerificationMethod};

/// Per-round target overrides for demos and presentations.
///
/// Indexed by round (round 1 reads index 0); rounds past the end of a list
/// fall back to the standard schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoOverrides {
    #[serde(default)]
    pub step_targets: Vec<u32>,
    #[serde(default)]
    pub wave_targets: Vec<u32>,
}

impl DemoOverrides {
    /// Override for `round` in `list`, if one is configured.
    pub(crate) fn target_for(list: &[u32], round: u32) -> Option<u32> {
        list.get(round.saturating_sub(1) as usize).copied()
    }
}

/// The session parameter bundle carried by a scheduled wake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeTrigger {
    /// Wall-clock time the alarm should fire.
    pub wake_time: DateTime<Utc>,
    /// The user's stated reason for getting up; spoken in announcements.
    pub reason: String,
    /// Name used in announcements.
    pub user_name: String,
    #[serde(default)]
    pub verification_method: VerificationMethod,
    #[serde(default)]
    pub personality: PersonalityProfile,
    #[serde(default)]
    pub sound: SoundProfile,
    /// Silent seconds between a verified round and the next ring.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    /// Round to resume into. Always 1 for a fresh schedule.
    #[serde(default = "default_round")]
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_overrides: Option<DemoOverrides>,
}

fn default_cooldown_seconds() -> u64 {
    300
}

fn default_round() -> u32 {
    1
}

impl WakeTrigger {
    /// The next wall-clock instant this trigger should fire after `now`.
    ///
    /// A wake time already in the past rolls forward to the same time
    /// tomorrow, so "07:00" set at 07:30 still rings next morning.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut target = self.wake_time;
        if target <= now {
            target += Duration::days(1);
        }
        target
    }
}

/// Handle for a wake scheduled with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledWake {
    /// Platform-assigned identifier, used to cancel.
    pub id: String,
    /// When the trigger will fire.
    pub fires_at: DateTime<Utc>,
}

/// Platform scheduling collaborator.
///
/// Implementations wrap whatever local-notification machinery the host has.
/// The engine only needs to hand over the trigger bundle and get a
/// cancellable handle back; delivery and the tap callback are host concerns.
pub trait WakeScheduler {
    fn schedule(&mut self, trigger: &WakeTrigger) -> Result<ScheduledWake, CoreError>;

    fn cancel(&mut self, handle: &ScheduledWake) -> Result<(), CoreError>;
}
