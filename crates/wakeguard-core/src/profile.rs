//! Session profile enums.
//!
//! These are the user-facing choices collected during onboarding and carried
//! into the session by the wake trigger: how to prove wakefulness, which
//! voice personality does the talking, and which audio bed loops while the
//! alarm rings.

use serde::{Deserialize, Serialize};

/// How the user proves they are awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    /// Walk a per-round number of steps.
    Steps,
    /// Wave a hand left-right in front of the camera.
    HandWave,
    /// Solve a sequence of mental challenges.
    Mental,
}

impl Default for VerificationMethod {
    fn default() -> Self {
        VerificationMethod::Steps
    }
}

/// Voice personality for spoken wake announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonalityProfile {
    Motivational,
    Sassy,
    DrillSergeant,
    Zen,
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        PersonalityProfile::Motivational
    }
}

/// Looping audio bed played while the alarm rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundProfile {
    Energetic,
    Calm,
    Rock,
    Electronic,
}

impl SoundProfile {
    /// Asset name of the looping bed, resolved by the host's audio sink.
    pub fn bed_name(self) -> &'static str {
        match self {
            SoundProfile::Energetic => "energetic",
            SoundProfile::Calm => "calm",
            SoundProfile::Rock => "rock",
            SoundProfile::Electronic => "electronic",
        }
    }
}

impl Default for SoundProfile {
    fn default() -> Self {
        SoundProfile::Energetic
    }
}
