//! Curated local challenge pools.
//!
//! These are the offline fallback for every challenge kind. Entries must
//! satisfy the same validators applied to remote content (word length,
//! integer answers, lowercase phrase tokens).

use super::{ChallengeItem, ChallengeKind, DifficultyTier};

const WORDS: [&str; 12] = [
    "planet", "sunrise", "morning", "thunder", "lantern", "compass",
    "granite", "harbor", "meadow", "cobalt", "ember", "spruce",
];

const ARITHMETIC: [(&str, i64); 8] = [
    ("17 + 26", 43),
    ("52 - 19", 33),
    ("8 x 7", 56),
    ("91 - 47", 44),
    ("34 + 58", 92),
    ("6 x 9", 54),
    ("75 - 38", 37),
    ("23 + 49", 72),
];

const PHRASES: [&str; 6] = [
    "the early sun climbs fast",
    "cold water wakes the mind",
    "today starts on my feet",
    "small steps beat the snooze",
    "morning light finds me standing",
    "the day will not wait",
];

/// The full curated pool for `kind`, in fixed order.
pub(super) fn items(kind: ChallengeKind) -> Vec<ChallengeItem> {
    match kind {
        ChallengeKind::ReverseWord => WORDS.iter().map(|w| reverse_word_item(w)).collect(),
        ChallengeKind::Arithmetic => ARITHMETIC
            .iter()
            .map(|(q, a)| arithmetic_item(q, *a))
            .collect(),
        ChallengeKind::Phrase => PHRASES.iter().map(|p| phrase_item(p)).collect(),
    }
}

/// Build a reverse-word item from a validated word.
pub(super) fn reverse_word_item(word: &str) -> ChallengeItem {
    let word = word.to_lowercase();
    let expected: String = word.chars().rev().collect();
    let difficulty = match word.len() {
        0..=5 => DifficultyTier::Easy,
        6..=7 => DifficultyTier::Medium,
        _ => DifficultyTier::Hard,
    };
    ChallengeItem {
        kind: ChallengeKind::ReverseWord,
        prompt: format!("Type \"{word}\" backwards"),
        expected_answer: expected,
        difficulty,
    }
}

/// Build an arithmetic item from a validated question/answer pair.
pub(super) fn arithmetic_item(question: &str, answer: i64) -> ChallengeItem {
    let difficulty = match answer.unsigned_abs() {
        0..=49 => DifficultyTier::Easy,
        50..=99 => DifficultyTier::Medium,
        _ => DifficultyTier::Hard,
    };
    ChallengeItem {
        kind: ChallengeKind::Arithmetic,
        prompt: format!("{question} = ?"),
        expected_answer: answer.to_string(),
        difficulty,
    }
}

/// Build an exact-phrase item from a validated phrase.
pub(super) fn phrase_item(phrase: &str) -> ChallengeItem {
    let difficulty = match phrase.split_whitespace().count() {
        0..=3 => DifficultyTier::Easy,
        4 => DifficultyTier::Medium,
        _ => DifficultyTier::Hard,
    };
    ChallengeItem {
        kind: ChallengeKind::Phrase,
        prompt: format!("Type exactly: {phrase}"),
        expected_answer: phrase.to_string(),
        difficulty,
    }
}
