//! Lemmatization engines
//!
//! The rebuild pipeline treats the engine as a black box: it hands over a
//! normalized surface form and gets back a lemma candidate. An empty candidate
//! means "no analysis", and the planner falls back to the surface itself.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{LemmaError, Result};
use crate::normalize::Normalizer;
use crate::signature::to_hex;

/// Capability interface for a lemmatization engine
pub trait Lemmatizer {
    /// Return a lemma candidate for a normalized surface form.
    ///
    /// May return the input unchanged, or an empty string when the engine has
    /// no analysis.
    fn lemmatize(&self, normalized_surface: &str) -> String;

    /// Identifies the engine and its data, recorded as the generation's
    /// `LemmaVersion`
    fn version(&self) -> String;
}

/// Engine that maps every surface to itself
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, normalized_surface: &str) -> String {
        normalized_surface.to_string()
    }

    fn version(&self) -> String {
        "identity".to_string()
    }
}

/// Engine backed by a `surface<TAB>lemma` lexicon file
#[derive(Debug, Clone)]
pub struct LexiconLemmatizer {
    entries: HashMap<String, String>,
    version: String,
}

impl LexiconLemmatizer {
    /// Load a lexicon file, normalizing its surfaces with `normalizer`
    pub fn load(path: &Path, normalizer: &Normalizer) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| LemmaError::Lexicon {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let content = String::from_utf8(bytes.clone()).map_err(|e| LemmaError::Lexicon {
            path: path.to_path_buf(),
            message: format!("not valid UTF-8: {}", e),
        })?;

        let entries = parse_lexicon(&content, normalizer).map_err(|message| LemmaError::Lexicon {
            path: path.to_path_buf(),
            message,
        })?;

        let digest = to_hex(&Sha256::digest(&bytes));
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "lexicon".to_string());

        tracing::debug!(
            "Loaded lexicon {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            entries,
            version: format!("lexicon:{}:{}", stem, &digest[..12]),
        })
    }

    /// Build an engine from in-memory pairs
    pub fn from_pairs<I, S, L>(pairs: I, normalizer: &Normalizer, version: &str) -> Self
    where
        I: IntoIterator<Item = (S, L)>,
        S: AsRef<str>,
        L: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(surface, lemma)| (normalizer.normalize(surface.as_ref()), lemma.into()))
            .collect();
        Self {
            entries,
            version: version.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lemmatizer for LexiconLemmatizer {
    fn lemmatize(&self, normalized_surface: &str) -> String {
        self.entries
            .get(normalized_surface)
            .cloned()
            .unwrap_or_default()
    }

    fn version(&self) -> String {
        self.version.clone()
    }
}

/// Parse lexicon content into normalized-surface -> raw-lemma entries.
/// Later lines override earlier ones for the same surface.
fn parse_lexicon(
    content: &str,
    normalizer: &Normalizer,
) -> std::result::Result<HashMap<String, String>, String> {
    let mut entries = HashMap::new();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((surface, lemma)) = line.split_once('\t') else {
            return Err(format!("line {}: expected surface<TAB>lemma", index + 1));
        };

        let surface = normalizer.normalize(surface);
        if surface.is_empty() {
            return Err(format!("line {}: empty surface form", index + 1));
        }
        entries.insert(surface, lemma.trim().to_string());
    }

    Ok(entries)
}

/// Choose the engine for a run: a lexicon when a path is given, identity otherwise
pub fn from_lexicon_path(
    lexicon: Option<&PathBuf>,
    normalizer: &Normalizer,
) -> Result<Box<dyn Lemmatizer>> {
    match lexicon {
        Some(path) => Ok(Box::new(LexiconLemmatizer::load(path, normalizer)?)),
        None => Ok(Box::new(IdentityLemmatizer)),
    }
}
