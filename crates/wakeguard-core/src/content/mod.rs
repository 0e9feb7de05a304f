//! Challenge content for the mental-challenge strategy.
//!
//! `ChallengeContentSource` is the only entry point. It tries the remote
//! generation collaborator first (validated, one retry), then falls back to
//! curated local pools. The caller never observes a failure: every request
//! returns a valid [`ChallengeItem`].
//!
//! ## Anti-repetition
//!
//! A per-kind used-registry tracks issued items for the life of the session.
//! Local picks skip used items until the pool is exhausted, after which
//! reuse begins rather than failing.

mod pool;
mod remote;
mod validate;

pub use remote::{RemoteContentClient, REQUEST_TIMEOUT_MS};

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Kind of mental challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Type a shown word backwards.
    ReverseWord,
    /// Answer an arithmetic question.
    Arithmetic,
    /// Type an exact phrase.
    Phrase,
}

impl ChallengeKind {
    /// All kinds, in declaration order. Shuffled once per round by the
    /// mental strategy.
    pub const ALL: [ChallengeKind; 3] = [
        ChallengeKind::ReverseWord,
        ChallengeKind::Arithmetic,
        ChallengeKind::Phrase,
    ];
}

/// Relative difficulty of an issued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

/// One issued challenge. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeItem {
    pub kind: ChallengeKind,
    /// Text shown (and spoken) to the user.
    pub prompt: String,
    /// Canonical expected answer; comparison is case-insensitive with
    /// whitespace collapsed.
    pub expected_answer: String,
    pub difficulty: DifficultyTier,
}

/// Remote challenge-generation collaborator.
///
/// The payload is untrusted: whatever comes back is validated per kind
/// before it can become a [`ChallengeItem`].
pub trait ContentProvider: Send {
    fn generate(&mut self, kind: ChallengeKind) -> Result<serde_json::Value, ContentError>;
}

/// Session-scoped bookkeeping of already-issued content.
#[derive(Debug, Default)]
pub struct UsedChallengeRegistry {
    used: HashMap<ChallengeKind, HashSet<String>>,
}

impl UsedChallengeRegistry {
    pub fn contains(&self, kind: ChallengeKind, key: &str) -> bool {
        self.used.get(&kind).is_some_and(|s| s.contains(key))
    }

    pub fn mark(&mut self, kind: ChallengeKind, key: &str) {
        self.used.entry(kind).or_default().insert(key.to_string());
    }

    pub fn count(&self, kind: ChallengeKind) -> usize {
        self.used.get(&kind).map_or(0, HashSet::len)
    }
}

/// Supplies challenge items; remote first, curated local pool as fallback.
pub struct ChallengeContentSource {
    provider: Option<Box<dyn ContentProvider>>,
    registry: UsedChallengeRegistry,
}

impl ChallengeContentSource {
    /// Source that serves only from the curated local pools.
    pub fn local_only() -> Self {
        Self {
            provider: None,
            registry: UsedChallengeRegistry::default(),
        }
    }

    /// Source that asks `provider` first and falls back locally.
    pub fn with_provider(provider: Box<dyn ContentProvider>) -> Self {
        Self {
            provider: Some(provider),
            registry: UsedChallengeRegistry::default(),
        }
    }

    /// Obtain a challenge of `kind`. Never fails.
    ///
    /// The remote attempt (when a provider is configured) is bounded: one
    /// initial try plus one retry, both subject to the provider's own
    /// timeout, with the response validated before acceptance. Anything
    /// else falls through to the local pool.
    pub fn request_challenge(&mut self, kind: ChallengeKind) -> ChallengeItem {
        if let Some(provider) = self.provider.as_mut() {
            for _ in 0..2 {
                let generated = provider
                    .generate(kind)
                    .and_then(|payload| validate::item_from_payload(kind, &payload));
                if let Ok(item) = generated {
                    self.registry.mark(kind, &item.prompt);
                    return item;
                }
            }
        }
        self.local_item(kind)
    }

    /// Issued-item count for `kind`.
    pub fn used_count(&self, kind: ChallengeKind) -> usize {
        self.registry.count(kind)
    }

    fn local_item(&mut self, kind: ChallengeKind) -> ChallengeItem {
        let pool = pool::items(kind);
        for item in &pool {
            if !self.registry.contains(kind, &item.prompt) {
                self.registry.mark(kind, &item.prompt);
                return item.clone();
            }
        }
        // Pool exhausted: reuse rather than fail.
        let pick = rand::thread_rng().gen_range(0..pool.len());
        pool[pick].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ScriptedContentProvider;

    #[test]
    fn local_requests_fill_then_reuse_registry() {
        let mut source = ChallengeContentSource::local_only();
        let pool_size = pool::items(ChallengeKind::Phrase).len();

        for n in 1..=pool_size {
            source.request_challenge(ChallengeKind::Phrase);
            assert_eq!(source.used_count(ChallengeKind::Phrase), n);
        }
        // Past exhaustion the registry stops growing but requests still
        // succeed.
        for _ in 0..3 {
            source.request_challenge(ChallengeKind::Phrase);
            assert_eq!(source.used_count(ChallengeKind::Phrase), pool_size);
        }
    }

    #[test]
    fn registries_are_tracked_per_kind() {
        let mut source = ChallengeContentSource::local_only();
        source.request_challenge(ChallengeKind::ReverseWord);
        source.request_challenge(ChallengeKind::ReverseWord);
        source.request_challenge(ChallengeKind::Arithmetic);
        assert_eq!(source.used_count(ChallengeKind::ReverseWord), 2);
        assert_eq!(source.used_count(ChallengeKind::Arithmetic), 1);
        assert_eq!(source.used_count(ChallengeKind::Phrase), 0);
    }

    #[test]
    fn provider_failure_retries_once_then_succeeds() {
        let provider = ScriptedContentProvider::new(vec![
            Err(ContentError::Http("boom".into())),
            Ok(serde_json::json!({ "text": "lantern" })),
        ]);
        let mut source = ChallengeContentSource::with_provider(Box::new(provider));
        let item = source.request_challenge(ChallengeKind::ReverseWord);
        assert_eq!(item.expected_answer, "nretnal");
    }

    #[test]
    fn two_failures_fall_back_to_local_pool() {
        let provider = ScriptedContentProvider::new(vec![
            Err(ContentError::Http("down".into())),
            Err(ContentError::Http("still down".into())),
        ]);
        let mut source = ChallengeContentSource::with_provider(Box::new(provider));
        let item = source.request_challenge(ChallengeKind::Arithmetic);
        assert_eq!(item.kind, ChallengeKind::Arithmetic);
        assert!(!item.prompt.is_empty());
    }

    #[test]
    fn invalid_remote_payload_is_rejected() {
        // A two-letter word fails the validator on both attempts.
        let provider = ScriptedContentProvider::new(vec![
            Ok(serde_json::json!({ "text": "ab" })),
            Ok(serde_json::json!({ "text": "ab" })),
        ]);
        let mut source = ChallengeContentSource::with_provider(Box::new(provider));
        let item = source.request_challenge(ChallengeKind::ReverseWord);
        // Served from the local pool instead.
        assert_ne!(item.expected_answer, "ba");
    }

    #[test]
    fn remote_items_enter_the_registry() {
        let provider = ScriptedContentProvider::new(vec![Ok(
            serde_json::json!({ "question": "2 + 2", "answer": 4 }),
        )]);
        let mut source = ChallengeContentSource::with_provider(Box::new(provider));
        source.request_challenge(ChallengeKind::Arithmetic);
        assert_eq!(source.used_count(ChallengeKind::Arithmetic), 1);
    }

    mod registry_properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// For any request count, the registry never exceeds the pool
            /// size and equals `min(requests, pool)` for local-only use.
            #[test]
            fn used_registry_is_min_of_requests_and_pool(requests in 0usize..40) {
                let mut source = ChallengeContentSource::local_only();
                let pool_size = pool::items(ChallengeKind::ReverseWord).len();
                for _ in 0..requests {
                    source.request_challenge(ChallengeKind::ReverseWord);
                }
                prop_assert_eq!(
                    source.used_count(ChallengeKind::ReverseWord),
                    requests.min(pool_size)
                );
            }
        }
    }
}
