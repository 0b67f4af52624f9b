//! lemmaforge: deterministic lemma layer rebuilds
//!
//! Maintains a derived lemma layer (`Lemma`, `TokenLemma`, `RebuildMetadata`)
//! over a token store in SQLite. Every rebuild is planned from scratch,
//! gated on a content signature, committed in a single transaction, and then
//! re-derived to confirm it is reproducible.
//!
//! # Example
//!
//! ```ignore
//! use lemmaforge::{DeterminismGuard, IdentityLemmatizer, Normalizer, RebuildOptions};
//! use std::path::Path;
//!
//! let mut conn = lemmaforge::store::open_database(Path::new("corpus.db"))?;
//! let guard = DeterminismGuard::new(Normalizer::default(), &IdentityLemmatizer);
//! let report = guard.run(&mut conn, RebuildOptions { dry_run: true, force: false }, |_| false)?;
//! println!("{} ({} lemmas)", report.signature, report.diff.new_lemma_count);
//! ```

pub mod cli;
pub mod commands;
pub mod commit;
pub mod config;
pub mod error;
pub mod guard;
pub mod lemmatizer;
pub mod normalize;
pub mod planner;
pub mod signature;
pub mod store;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use commit::{CommitReceipt, Committer, Provenance};
pub use config::LemmaforgeConfig;
pub use error::{LemmaError, Result};
pub use guard::{DeterminismGuard, DriftCheck, Outcome, RebuildOptions, RebuildReport, Verification};
pub use lemmatizer::{IdentityLemmatizer, Lemmatizer, LexiconLemmatizer};
pub use normalize::{normalize, Normalizer};
pub use planner::{DiffSummary, Plan, Planner, TokenLemmaPair};
pub use signature::compute_signature;
pub use store::{ExistingState, RebuildMetadata, Token, TokenId};
