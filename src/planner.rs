//! Rebuild planning: derive the proposed lemma layer and diff it against the
//! committed one
//!
//! Planning is pure. Given the same tokens and a deterministic engine it
//! always yields the same lemma set, pairs and signature; the guard relies on
//! this to verify a commit after the fact.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::lemmatizer::Lemmatizer;
use crate::normalize::Normalizer;
use crate::signature::compute_signature;
use crate::store::{ExistingState, Token, TokenId};

/// A token's assignment to a lemma text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenLemmaPair {
    pub token_id: TokenId,
    pub lemma: String,
}

/// Counts describing how a proposed layer differs from the committed one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub old_lemma_count: usize,
    pub new_lemma_count: usize,
    /// Lemmas in the new set but not the old
    pub added: usize,
    /// Lemmas in the old set but not the new
    pub removed: usize,
    /// Tokens whose mapping changed, appeared, or disappeared
    pub tokens_changed: usize,
}

impl DiffSummary {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.tokens_changed == 0
    }
}

/// Proposed lemma layer for one rebuild attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub lemmas: BTreeSet<String>,
    /// In token order
    pub pairs: Vec<TokenLemmaPair>,
    pub signature: String,
    pub diff: DiffSummary,
}

/// Derives plans from the token store with a fixed normalizer and engine
pub struct Planner<'a> {
    normalizer: Normalizer,
    lemmatizer: &'a dyn Lemmatizer,
}

impl<'a> Planner<'a> {
    pub fn new(normalizer: Normalizer, lemmatizer: &'a dyn Lemmatizer) -> Self {
        Self {
            normalizer,
            lemmatizer,
        }
    }

    /// Resolve one surface form to its lemma, or `None` when the surface
    /// normalizes to nothing.
    ///
    /// A blank engine result falls back to the normalized surface.
    pub fn resolve(&self, surface_form: &str) -> Option<String> {
        let surface = self.normalizer.normalize(surface_form);
        if surface.is_empty() {
            return None;
        }

        let candidate = self.normalizer.normalize(&self.lemmatizer.lemmatize(&surface));
        if candidate.is_empty() {
            Some(surface)
        } else {
            Some(candidate)
        }
    }

    /// Plan a full rebuild over `tokens` against the committed `existing` state
    pub fn plan(&self, tokens: &[Token], existing: &ExistingState) -> Plan {
        let mut lemmas = BTreeSet::new();
        let mut pairs = Vec::with_capacity(tokens.len());
        let mut skipped = 0usize;

        for token in tokens {
            let Some(lemma) = self.resolve(&token.surface_form) else {
                skipped += 1;
                continue;
            };
            lemmas.insert(lemma.clone());
            pairs.push(TokenLemmaPair {
                token_id: token.token_id,
                lemma,
            });
        }

        let signature = compute_signature(&lemmas);
        let diff = summarize_diff(existing, &lemmas, &pairs);

        tracing::debug!(
            "Planned {} lemmas for {} tokens ({} empty surfaces skipped)",
            lemmas.len(),
            pairs.len(),
            skipped
        );

        Plan {
            lemmas,
            pairs,
            signature,
            diff,
        }
    }
}

/// Compare a proposed layer against the committed one
pub fn summarize_diff(
    existing: &ExistingState,
    new_lemmas: &BTreeSet<String>,
    new_pairs: &[TokenLemmaPair],
) -> DiffSummary {
    let new_map: BTreeMap<TokenId, &str> = new_pairs
        .iter()
        .map(|pair| (pair.token_id, pair.lemma.as_str()))
        .collect();

    let changed_or_gained = new_map
        .iter()
        .filter(|&(id, lemma)| existing.token_lemmas.get(id).map(String::as_str) != Some(*lemma))
        .count();
    let lost = existing
        .token_lemmas
        .keys()
        .filter(|&id| !new_map.contains_key(id))
        .count();

    DiffSummary {
        old_lemma_count: existing.lemmas.len(),
        new_lemma_count: new_lemmas.len(),
        added: new_lemmas.difference(&existing.lemmas).count(),
        removed: existing.lemmas.difference(new_lemmas).count(),
        tokens_changed: changed_or_gained + lost,
    }
}
