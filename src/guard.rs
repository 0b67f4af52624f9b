//! Determinism guard around the committer
//!
//! # Flow
//!
//! 1. Plan the new generation from the token store.
//! 2. Pre-commit drift check against the latest recorded signature. A
//!    mismatch aborts unless forced.
//! 3. Dry runs stop here. Otherwise ask for confirmation (skipped when forced).
//! 4. Commit atomically.
//! 5. Re-plan from the same tokens against the state read back from the
//!    database. A mismatch is reported, but the data stays committed.
//!
//! | Outcome | Exit code |
//! |---------|-----------|
//! | Committed, DryRun, Cancelled | 0 |
//! | DriftAborted | 2 |
//! | DeterminismFailed | 3 |

use rusqlite::Connection;
use serde::Serialize;

use crate::commit::{Committer, Provenance};
use crate::error::Result;
use crate::lemmatizer::Lemmatizer;
use crate::normalize::Normalizer;
use crate::planner::{DiffSummary, Plan, Planner};
use crate::signature::compute_signature;
use crate::store::{self, RebuildMetadata, Token};

// ============================================================================
// Drift Check
// ============================================================================

/// Verdict of comparing a fresh signature against history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftCheck {
    /// No generation has ever been committed
    NoHistory,
    /// Fresh signature equals the latest recorded one
    Match { signature: String },
    /// Fresh signature differs from the latest recorded one
    Drift { recorded: String, computed: String },
}

impl DriftCheck {
    #[must_use]
    pub fn evaluate(latest: Option<&RebuildMetadata>, computed: &str) -> Self {
        match latest {
            None => Self::NoHistory,
            Some(meta) if meta.signature == computed => Self::Match {
                signature: computed.to_string(),
            },
            Some(meta) => Self::Drift {
                recorded: meta.signature.clone(),
                computed: computed.to_string(),
            },
        }
    }

    pub fn is_drift(&self) -> bool {
        matches!(self, Self::Drift { .. })
    }
}

// ============================================================================
// Post-commit Verification
// ============================================================================

/// Re-derivation of a just-committed generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub committed_signature: String,
    pub committed_lemma_count: usize,
    pub rederived_signature: String,
    pub rederived_lemma_count: usize,
    /// Signature of the lemma texts read back from the `Lemma` table
    pub readback_signature: String,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.rederived_signature == self.committed_signature
            && self.rederived_lemma_count == self.committed_lemma_count
            && self.readback_signature == self.committed_signature
    }
}

// ============================================================================
// Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Committed,
    DryRun,
    Cancelled,
    DriftAborted,
    DeterminismFailed,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Committed | Self::DryRun | Self::Cancelled => 0,
            Self::DriftAborted => 2,
            Self::DeterminismFailed => 3,
        }
    }
}

/// Everything a rebuild invocation observed and decided
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub outcome: Outcome,
    pub signature: String,
    pub token_count: usize,
    pub mapped_tokens: usize,
    pub diff: DiffSummary,
    pub drift: DriftCheck,
    pub committed: Option<RebuildMetadata>,
    pub verification: Option<Verification>,
}

/// Flags for one rebuild invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct RebuildOptions {
    /// Plan and report only
    pub dry_run: bool,
    /// Proceed past drift and skip confirmation
    pub force: bool,
}

// ============================================================================
// Guard
// ============================================================================

pub struct DeterminismGuard<'a> {
    planner: Planner<'a>,
    committer: Committer,
    provenance: Provenance,
}

impl<'a> DeterminismGuard<'a> {
    pub fn new(normalizer: Normalizer, lemmatizer: &'a dyn Lemmatizer) -> Self {
        let provenance = describe_environment(&normalizer, lemmatizer);
        Self {
            planner: Planner::new(normalizer, lemmatizer),
            committer: Committer::new(),
            provenance,
        }
    }

    #[must_use]
    pub fn with_committer(mut self, committer: Committer) -> Self {
        self.committer = committer;
        self
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Run a guarded rebuild.
    ///
    /// `confirm` is consulted only for non-forced, non-dry runs that passed the
    /// drift check; returning `false` cancels without writing.
    pub fn run<F>(
        &self,
        conn: &mut Connection,
        options: RebuildOptions,
        confirm: F,
    ) -> Result<RebuildReport>
    where
        F: FnOnce(&Plan) -> bool,
    {
        store::ensure_token_store(conn)?;
        let tokens = store::load_tokens(conn)?;
        let existing = store::load_existing_state(conn)?;
        let latest = store::latest_metadata(conn)?;

        let plan = self.planner.plan(&tokens, &existing);
        let drift = DriftCheck::evaluate(latest.as_ref(), &plan.signature);

        tracing::info!(
            "Planned {} lemmas over {} tokens (+{} -{} lemmas, {} tokens changed)",
            plan.lemmas.len(),
            tokens.len(),
            plan.diff.added,
            plan.diff.removed,
            plan.diff.tokens_changed
        );

        let mut report = RebuildReport {
            outcome: Outcome::DryRun,
            signature: plan.signature.clone(),
            token_count: tokens.len(),
            mapped_tokens: plan.pairs.len(),
            diff: plan.diff,
            drift,
            committed: None,
            verification: None,
        };

        if let DriftCheck::Drift { recorded, computed } = &report.drift {
            if !options.force {
                tracing::warn!(
                    "Signature drift: recorded {} but computed {}; aborting without changes",
                    recorded,
                    computed
                );
                report.outcome = Outcome::DriftAborted;
                return Ok(report);
            }
            tracing::warn!(
                "Signature drift: recorded {} but computed {}; proceeding (forced)",
                recorded,
                computed
            );
        }

        if options.dry_run {
            tracing::info!("Dry run: no database changes made");
            report.outcome = Outcome::DryRun;
            return Ok(report);
        }

        if !options.force && !confirm(&plan) {
            tracing::info!("Rebuild cancelled");
            report.outcome = Outcome::Cancelled;
            return Ok(report);
        }

        let receipt = self.committer.commit(
            conn,
            &plan.lemmas,
            &plan.pairs,
            &plan.signature,
            &self.provenance,
        )?;

        let verification = self.verify(conn, &tokens, &receipt.metadata)?;
        report.outcome = if verification.passed() {
            Outcome::Committed
        } else {
            tracing::warn!(
                "Determinism check failed after commit: committed {} ({} lemmas), re-derived {} ({} lemmas), read back {}",
                verification.committed_signature,
                verification.committed_lemma_count,
                verification.rederived_signature,
                verification.rederived_lemma_count,
                verification.readback_signature
            );
            Outcome::DeterminismFailed
        };
        report.committed = Some(receipt.metadata);
        report.verification = Some(verification);

        Ok(report)
    }

    /// Re-derive a committed generation from scratch and compare
    pub fn verify(
        &self,
        conn: &Connection,
        tokens: &[Token],
        committed: &RebuildMetadata,
    ) -> Result<Verification> {
        let readback = store::load_existing_state(conn)?;
        let rederived = self.planner.plan(tokens, &readback);

        Ok(Verification {
            committed_signature: committed.signature.clone(),
            committed_lemma_count: committed.lemma_count.max(0) as usize,
            rederived_signature: rederived.signature,
            rederived_lemma_count: rederived.lemmas.len(),
            readback_signature: compute_signature(&readback.lemmas),
        })
    }
}

/// Provenance for generations built by this process
pub fn describe_environment(normalizer: &Normalizer, lemmatizer: &dyn Lemmatizer) -> Provenance {
    let lemma_version = lemmatizer.version();
    Provenance {
        notes: format!(
            "lemmaforge={};sqlite={};normalizer={};engine={}",
            env!("CARGO_PKG_VERSION"),
            rusqlite::version(),
            normalizer.profile(),
            lemma_version
        ),
        lemma_version,
    }
}
