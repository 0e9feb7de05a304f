//! Engine events.
//!
//! Every externally visible state change produces an [`Event`]. The engine
//! never logs or renders anything itself -- hosts drain events from command
//! and tick calls and decide what to show, speak, or record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::ChallengeKind;
use crate::profile::{SoundProfile, VerificationMethod};
use crate::session::RoundState;

/// Every state change in the engine produces an Event.
/// Hosts poll for events; nothing inside the crate consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A trigger fired and the session entered its first ring phase.
    SessionStarted {
        session_id: Uuid,
        round: u32,
        at: DateTime<Utc>,
    },
    /// A ring phase began (round 1 or after a cooldown expired).
    RingStarted {
        round: u32,
        at: DateTime<Utc>,
    },
    /// The alarm signal started: audio bed, vibration pattern, speech cadence.
    AlarmStarted {
        profile: SoundProfile,
        at: DateTime<Utc>,
    },
    /// The audio bed failed to load; signal degraded to vibration + speech.
    AlarmDegraded {
        message: String,
        at: DateTime<Utc>,
    },
    /// Audio volume reduced without stopping the loop.
    AlarmDucked {
        level: f32,
        at: DateTime<Utc>,
    },
    /// Audio, vibration, and in-flight speech all stopped.
    AlarmStopped {
        at: DateTime<Utc>,
    },
    /// A wake announcement was handed to the speech synthesizer.
    AnnouncementSpoken {
        text: String,
        at: DateTime<Utc>,
    },
    /// The user acknowledged the ring and verification began.
    VerifyingStarted {
        round: u32,
        method: VerificationMethod,
        target: u32,
        at: DateTime<Utc>,
    },
    /// The active strategy made measurable progress.
    ProgressUpdated {
        round: u32,
        current: u32,
        target: u32,
        at: DateTime<Utc>,
    },
    /// A mental challenge sub-task was issued.
    ChallengePresented {
        round: u32,
        kind: ChallengeKind,
        prompt: String,
        at: DateTime<Utc>,
    },
    /// A submitted answer did not match; the same sub-task is retried.
    AnswerRejected {
        round: u32,
        at: DateTime<Utc>,
    },
    /// Sensing failed and the grace period elapsed; manual confirmation
    /// is now accepted.
    FallbackOffered {
        round: u32,
        at: DateTime<Utc>,
    },
    /// The round was redirected to a different strategy (hand-wave watchdog).
    StrategyRedirected {
        round: u32,
        from: VerificationMethod,
        to: VerificationMethod,
        at: DateTime<Utc>,
    },
    /// A round was verified; the session is not finished yet.
    RoundCompleted {
        round: u32,
        at: DateTime<Utc>,
    },
    /// The silent between-rounds countdown started.
    /// `deadline_epoch_ms` is the absolute wall-clock deadline.
    CooldownStarted {
        round: u32,
        deadline_epoch_ms: u64,
        at: DateTime<Utc>,
    },
    /// Every round verified; the alarm signal is fully released.
    SessionCompleted {
        session_id: Uuid,
        rounds: u32,
        at: DateTime<Utc>,
    },
    /// The session was abandoned before completion.
    SessionAbandoned {
        session_id: Uuid,
        state: RoundState,
        round: u32,
        at: DateTime<Utc>,
    },
}
