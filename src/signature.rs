//! Content signatures over lemma sets
//!
//! A signature is the lowercase hex SHA-256 of the distinct lemma texts,
//! sorted byte-wise and joined with `\n`. It is the only oracle for "did the
//! lemma layer change" and "is the rebuild reproducible".

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

/// Compute the signature of a lemma collection.
///
/// Duplicates are collapsed and the input is sorted first, so neither
/// iteration order nor multiplicity affects the result.
pub fn compute_signature<I, S>(lemmas: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let sorted: BTreeSet<String> = lemmas
        .into_iter()
        .map(|lemma| lemma.as_ref().to_string())
        .collect();

    let mut hasher = Sha256::new();
    for (i, lemma) in sorted.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(lemma.as_bytes());
    }
    to_hex(&hasher.finalize())
}

/// Lowercase hex encoding
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
