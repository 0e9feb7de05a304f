//! Spoken wake announcements.
//!
//! Each ring phase draws one message from the active personality's template
//! pool and repeats it on a fixed cadence until the user acknowledges. The
//! signal controller gates each utterance on the synthesizer's
//! "is currently speaking" check, so a long message is never talked over.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::profile::PersonalityProfile;

/// Cadence of repeated announcements while ringing.
pub const SPEECH_INTERVAL_MS: u64 = 9_000;

const MOTIVATIONAL: [&str; 4] = [
    "Good morning {name}! Let's crush {reason} today.",
    "Rise and shine {name}! {reason} isn't going to handle itself. You've got this.",
    "Hey {name}, today is YOUR day. Get up and own {reason}.",
    "{name}, champions don't snooze. Time to show up for {reason}.",
];

const SASSY: [&str; 3] = [
    "Alright {name}. Enough. Get up for {reason}.",
    "{name}, your bed doesn't pay your bills. {reason} does.",
    "Still horizontal {name}? Cute. {reason} isn't going to do itself.",
];

const DRILL_SERGEANT: [&str; 2] = [
    "UP NOW {name}! Mission: {reason}. MOVE.",
    "{name}! On your feet immediately. {reason} doesn't wait.",
];

const ZEN: [&str; 2] = [
    "Good morning {name}. Breathe once. Stand up. Begin: {reason}.",
    "{name}, a new day unfolds gently. {reason} awaits your calm presence.",
];

fn templates(personality: PersonalityProfile) -> &'static [&'static str] {
    match personality {
        PersonalityProfile::Motivational => &MOTIVATIONAL,
        PersonalityProfile::Sassy => &SASSY,
        PersonalityProfile::DrillSergeant => &DRILL_SERGEANT,
        PersonalityProfile::Zen => &ZEN,
    }
}

/// Who the announcement talks to and about what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementContext {
    pub user_name: String,
    pub reason: String,
    pub personality: PersonalityProfile,
}

impl AnnouncementContext {
    pub fn new(user_name: &str, reason: &str, personality: PersonalityProfile) -> Self {
        Self {
            user_name: user_name.to_string(),
            reason: reason.to_string(),
            personality,
        }
    }

    fn name(&self) -> &str {
        let trimmed = self.user_name.trim();
        if trimmed.is_empty() {
            "you"
        } else {
            trimmed
        }
    }

    fn reason(&self) -> &str {
        let trimmed = self.reason.trim();
        if trimmed.is_empty() {
            "your goals"
        } else {
            trimmed
        }
    }
}

/// Repeating-announcement state for one alarm signal.
#[derive(Debug, Clone)]
pub struct Announcer {
    ctx: AnnouncementContext,
    message: String,
    next_at_ms: Option<u64>,
}

impl Announcer {
    pub fn new(ctx: AnnouncementContext) -> Self {
        Self {
            ctx,
            message: String::new(),
            next_at_ms: None,
        }
    }

    /// Start a ring phase: draw a fresh message, first utterance due
    /// immediately.
    pub fn begin(&mut self, now_ms: u64) {
        self.message = self.draw();
        self.next_at_ms = Some(now_ms);
    }

    /// Stop the cadence (duck or stop).
    pub fn pause(&mut self) {
        self.next_at_ms = None;
    }

    /// Whether an utterance is due. Advances the cadence either way -- a
    /// skipped utterance (synthesizer still busy) is not made up later.
    pub fn cadence_due(&mut self, now_ms: u64) -> bool {
        match self.next_at_ms {
            Some(due) if now_ms >= due => {
                self.next_at_ms = Some(now_ms + SPEECH_INTERVAL_MS);
                true
            }
            _ => false,
        }
    }

    /// The ring phase's message.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn draw(&self) -> String {
        let template = templates(self.ctx.personality)
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("Good morning {name}! Time to get up for {reason}.");
        template
            .replace("{name}", self.ctx.name())
            .replace("{reason}", self.ctx.reason())
    }
}
