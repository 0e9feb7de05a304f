//! Output-format validators for generated content.
//!
//! The remote collaborator is untrusted: every payload is checked against
//! the strict per-kind format before it can become a [`ChallengeItem`].
//! Rejection is not an error the caller sees -- the source falls back to
//! the curated pool.

use serde_json::Value;

use super::{pool, ChallengeItem, ChallengeKind};
use crate::error::ContentError;

/// Validate and canonicalize a reverse-word candidate: a single 4-10 letter
/// alphabetic word. Returns the lowercase form.
pub(super) fn reverse_word(raw: &str) -> Result<String, ContentError> {
    let word = raw.trim();
    if !(4..=10).contains(&word.chars().count()) {
        return Err(ContentError::Rejected(format!(
            "word length {} outside 4..=10",
            word.chars().count()
        )));
    }
    if !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ContentError::Rejected("word is not purely alphabetic".into()));
    }
    Ok(word.to_lowercase())
}

/// Validate an arithmetic question/answer pair. The question must be
/// non-empty and contain a digit; the answer must be an integer (JSON
/// number or numeric string).
pub(super) fn arithmetic(question: &str, answer: &Value) -> Result<(String, i64), ContentError> {
    let question = question.trim();
    if question.is_empty() || !question.chars().any(|c| c.is_ascii_digit()) {
        return Err(ContentError::Rejected("question is not arithmetic".into()));
    }
    let answer = match answer {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ContentError::Rejected("answer is not an integer".into()))?,
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ContentError::Rejected("answer does not parse as an integer".into()))?,
        _ => return Err(ContentError::Rejected("answer has no integer form".into())),
    };
    Ok((question.to_string(), answer))
}

/// Validate and canonicalize a phrase: at least 3 lowercase alphabetic
/// tokens. Returns the whitespace-collapsed form.
pub(super) fn phrase(raw: &str) -> Result<String, ContentError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(ContentError::Rejected(format!(
            "phrase has {} tokens, need at least 3",
            tokens.len()
        )));
    }
    if !tokens
        .iter()
        .all(|t| t.chars().all(|c| c.is_ascii_lowercase()))
    {
        return Err(ContentError::Rejected(
            "phrase tokens must be lowercase letters".into(),
        ));
    }
    Ok(tokens.join(" "))
}

/// Turn a raw provider payload into a validated item.
pub(super) fn item_from_payload(
    kind: ChallengeKind,
    payload: &Value,
) -> Result<ChallengeItem, ContentError> {
    match kind {
        ChallengeKind::ReverseWord => {
            let text = text_field(payload)?;
            let word = reverse_word(text)?;
            Ok(pool::reverse_word_item(&word))
        }
        ChallengeKind::Arithmetic => {
            let question = payload
                .get("question")
                .and_then(Value::as_str)
                .ok_or_else(|| ContentError::MalformedResponse("missing question".into()))?;
            let answer = payload
                .get("answer")
                .ok_or_else(|| ContentError::MalformedResponse("missing answer".into()))?;
            let (question, answer) = arithmetic(question, answer)?;
            Ok(pool::arithmetic_item(&question, answer))
        }
        ChallengeKind::Phrase => {
            let text = text_field(payload)?;
            let phrase = phrase(text)?;
            Ok(pool::phrase_item(&phrase))
        }
    }
}

fn text_field(payload: &Value) -> Result<&str, ContentError> {
    payload
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| ContentError::MalformedResponse("missing text field".into()))
}
