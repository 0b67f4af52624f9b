//! Error types and exit codes for lemmaforge

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Main error type for lemmaforge operations
#[derive(Error, Debug)]
pub enum LemmaError {
    #[error("Database not found: {path}")]
    DatabaseNotFound { path: PathBuf },

    #[error("Schema object missing: {object}")]
    SchemaMissing { object: String },

    #[error("Commit failed during {step}: {source}")]
    CommitFailed {
        step: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Token {token_id} maps to lemma {lemma:?}, which is not part of the lemma set")]
    UnresolvedLemma { token_id: i64, lemma: String },

    #[error("Lexicon error in {path}: {message}")]
    Lexicon { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LemmaError {
    /// Convert error to the process exit code:
    /// - 1: Database not found / schema missing / IO error
    /// - 4: Database or transaction failure
    /// - 5: Configuration or lexicon failure
    ///
    /// Codes 2 and 3 are reserved for guard outcomes, which are not errors.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::DatabaseNotFound { .. } => 1,
            Self::SchemaMissing { .. } => 1,
            Self::Io(_) => 1,
            Self::CommitFailed { .. } => 4,
            Self::UnresolvedLemma { .. } => 4,
            Self::Sqlite(_) => 4,
            Self::Lexicon { .. } => 5,
            Self::Config { .. } => 5,
        }
    }
}

/// Result type alias for lemmaforge operations
pub type Result<T> = std::result::Result<T, LemmaError>;
