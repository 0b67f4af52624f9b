//! Text normalization for surface forms and lemma text
//!
//! Every string that takes part in a comparison, a database write or a
//! signature goes through [`Normalizer::normalize`] first. The pipeline is:
//!
//! 1. Canonical composition (NFC). With diacritic folding enabled the text is
//!    decomposed, stripped of combining marks, and recomposed instead.
//! 2. Trim leading and trailing whitespace.
//! 3. Lowercase.
//! 4. Fold the word-final sigma `ς` to its standard form `σ`.
//!
//! The function is total: it never fails, and empty input yields empty output.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const FINAL_SIGMA: char = 'ς';
const SIGMA: char = 'σ';

/// Normalization profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalizer {
    /// Strip combining marks (accents, breathings, iota subscript)
    pub fold_diacritics: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            fold_diacritics: true,
        }
    }
}

impl Normalizer {
    /// Profile that only composes, trims, lowercases and folds sigma
    pub fn composed_only() -> Self {
        Self {
            fold_diacritics: false,
        }
    }

    /// Normalize a raw string into its comparable form
    pub fn normalize(&self, raw: &str) -> String {
        let composed: String = if self.fold_diacritics {
            raw.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
        } else {
            raw.nfc().collect()
        };

        composed
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == FINAL_SIGMA { SIGMA } else { c })
            .collect()
    }

    /// Short profile name recorded in rebuild provenance
    pub fn profile(&self) -> &'static str {
        if self.fold_diacritics {
            "nfc+fold-diacritics"
        } else {
            "nfc"
        }
    }
}

/// Normalize with the default profile
pub fn normalize(raw: &str) -> String {
    Normalizer::default().normalize(raw)
}
