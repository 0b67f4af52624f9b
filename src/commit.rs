//! Transactional replacement of the lemma layer
//!
//! One commit drops and recreates `Lemma` and `TokenLemma`, bulk inserts the
//! new generation and appends one `RebuildMetadata` row, all inside a single
//! SQLite transaction. Any failing step drops the transaction, which rolls
//! everything back; readers only ever see the previous generation or the new
//! one.

use std::collections::{BTreeSet, HashMap};

use rusqlite::{params, Connection, Transaction};

use crate::error::{LemmaError, Result};
use crate::planner::TokenLemmaPair;
use crate::store::RebuildMetadata;

const DROP_LEMMA_LAYER: &str = r#"
    DROP TABLE IF EXISTS TokenLemma;
    DROP TABLE IF EXISTS Lemma;
"#;

const CREATE_LEMMA_LAYER: &str = r#"
    CREATE TABLE Lemma (
        LemmaId     INTEGER PRIMARY KEY AUTOINCREMENT,
        LemmaText   TEXT NOT NULL UNIQUE
    );

    CREATE TABLE TokenLemma (
        TokenId INTEGER NOT NULL,
        LemmaId INTEGER NOT NULL,
        PRIMARY KEY (TokenId, LemmaId),
        FOREIGN KEY (TokenId) REFERENCES Token(TokenId),
        FOREIGN KEY (LemmaId) REFERENCES Lemma(LemmaId)
    );

    CREATE TABLE IF NOT EXISTS RebuildMetadata (
        LemmaVersion TEXT NOT NULL,
        BuiltAt      TEXT NOT NULL,
        LemmaCount   INTEGER NOT NULL,
        Signature    TEXT NOT NULL,
        Notes        TEXT
    );
"#;

/// Where a generation came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Engine identity, stored as `LemmaVersion`
    pub lemma_version: String,
    /// Free-form environment description, stored as `Notes`
    pub notes: String,
}

/// Counts for a committed generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub lemmas_inserted: usize,
    pub token_lemmas_inserted: usize,
    pub metadata: RebuildMetadata,
}

/// Atomic "replace everything" primitive for the lemma layer
#[derive(Debug, Clone, Default)]
pub struct Committer {
    built_at: Option<String>,
}

impl Committer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the recorded `BuiltAt` instead of reading the clock
    pub fn with_built_at(mut self, built_at: impl Into<String>) -> Self {
        self.built_at = Some(built_at.into());
        self
    }

    /// Replace the lemma layer with a new generation.
    ///
    /// Lemma identifiers are assigned fresh, in sorted text order. Every pair
    /// must name a lemma in `lemmas`.
    pub fn commit(
        &self,
        conn: &mut Connection,
        lemmas: &BTreeSet<String>,
        pairs: &[TokenLemmaPair],
        signature: &str,
        provenance: &Provenance,
    ) -> Result<CommitReceipt> {
        let metadata = RebuildMetadata {
            lemma_version: provenance.lemma_version.clone(),
            built_at: self.built_at.clone().unwrap_or_else(utc_timestamp),
            lemma_count: lemmas.len() as i64,
            signature: signature.to_string(),
            notes: Some(provenance.notes.clone()),
        };

        let tx = conn
            .transaction()
            .map_err(|e| commit_error("begin transaction", e))?;

        tx.execute_batch(DROP_LEMMA_LAYER)
            .map_err(|e| commit_error("drop lemma layer", e))?;
        tx.execute_batch(CREATE_LEMMA_LAYER)
            .map_err(|e| commit_error("create lemma layer", e))?;

        let lemma_ids = insert_lemmas(&tx, lemmas)?;
        let token_lemmas_inserted = insert_token_lemmas(&tx, pairs, &lemma_ids)?;
        insert_metadata(&tx, &metadata)?;

        tx.commit().map_err(|e| commit_error("commit", e))?;

        tracing::info!(
            "Committed generation: {} lemmas, {} token mappings, signature {}",
            lemma_ids.len(),
            token_lemmas_inserted,
            metadata.signature
        );

        Ok(CommitReceipt {
            lemmas_inserted: lemma_ids.len(),
            token_lemmas_inserted,
            metadata,
        })
    }
}

fn insert_lemmas(tx: &Transaction<'_>, lemmas: &BTreeSet<String>) -> Result<HashMap<String, i64>> {
    let mut ids = HashMap::with_capacity(lemmas.len());
    let mut stmt = tx
        .prepare_cached("INSERT INTO Lemma (LemmaText) VALUES (?1)")
        .map_err(|e| commit_error("insert Lemma", e))?;

    for lemma in lemmas {
        stmt.execute([lemma])
            .map_err(|e| commit_error("insert Lemma", e))?;
        ids.insert(lemma.clone(), tx.last_insert_rowid());
    }

    Ok(ids)
}

fn insert_token_lemmas(
    tx: &Transaction<'_>,
    pairs: &[TokenLemmaPair],
    lemma_ids: &HashMap<String, i64>,
) -> Result<usize> {
    let mut stmt = tx
        .prepare_cached("INSERT INTO TokenLemma (TokenId, LemmaId) VALUES (?1, ?2)")
        .map_err(|e| commit_error("insert TokenLemma", e))?;

    for pair in pairs {
        let lemma_id = lemma_ids
            .get(&pair.lemma)
            .ok_or_else(|| LemmaError::UnresolvedLemma {
                token_id: pair.token_id,
                lemma: pair.lemma.clone(),
            })?;
        stmt.execute(params![pair.token_id, lemma_id])
            .map_err(|e| commit_error("insert TokenLemma", e))?;
    }

    Ok(pairs.len())
}

fn insert_metadata(tx: &Transaction<'_>, metadata: &RebuildMetadata) -> Result<()> {
    tx.execute(
        "INSERT INTO RebuildMetadata (LemmaVersion, BuiltAt, LemmaCount, Signature, Notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            metadata.lemma_version,
            metadata.built_at,
            metadata.lemma_count,
            metadata.signature,
            metadata.notes,
        ],
    )
    .map_err(|e| commit_error("insert RebuildMetadata", e))?;
    Ok(())
}

fn commit_error(step: &'static str, source: rusqlite::Error) -> LemmaError {
    tracing::debug!("Commit step '{}' failed: {}", step, source);
    LemmaError::CommitFailed { step, source }
}

/// Current UTC time, second precision, `Z` suffix
pub fn utc_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
