//! Rebuild command handler - Guarded lemma layer rebuild

use dialoguer::Confirm;

use crate::cli::{OutputFormat, RebuildArgs};
use crate::commands::{banner, to_json, CommandContext, CommandOutput};
use crate::error::Result;
use crate::guard::{DeterminismGuard, DriftCheck, Outcome, RebuildOptions, RebuildReport};
use crate::lemmatizer;
use crate::normalize::Normalizer;
use crate::planner::{DiffSummary, Plan};
use crate::store;

/// Run the rebuild command
pub fn run_rebuild(args: &RebuildArgs, ctx: &CommandContext) -> Result<CommandOutput> {
    let db_path = ctx.config.database_path(args.db.as_ref());
    let mut conn = store::open_database(&db_path)?;

    let normalizer = if args.no_fold_diacritics {
        Normalizer::composed_only()
    } else {
        ctx.config.normalizer()
    };
    let lexicon = args.lexicon.as_ref().or(ctx.config.lemmatizer.lexicon.as_ref());
    let engine = lemmatizer::from_lexicon_path(lexicon, &normalizer)?;

    tracing::info!(
        "Rebuilding lemma layer in {} with engine {}",
        db_path.display(),
        engine.version()
    );

    let guard = DeterminismGuard::new(normalizer, engine.as_ref());
    let options = RebuildOptions {
        dry_run: args.dry_run,
        force: args.force,
    };
    let report = guard.run(&mut conn, options, confirm_interactively)?;

    let text = match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "_type": "rebuild",
            "database": db_path.to_string_lossy(),
            "lemma_version": guard.provenance().lemma_version,
            "report": report,
        })),
        OutputFormat::Text => render_text(&report),
    };

    Ok(CommandOutput {
        text,
        status: report.outcome.exit_code(),
    })
}

/// Show the diff and ask before writing. A non-interactive terminal declines.
fn confirm_interactively(plan: &Plan) -> bool {
    eprint!("{}", render_diff(&plan.diff, &plan.signature));
    match Confirm::new()
        .with_prompt("Proceed with transactional lemma rebuild?")
        .default(false)
        .interact()
    {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!("Confirmation unavailable ({}); use --force to skip it", e);
            false
        }
    }
}

fn render_diff(diff: &DiffSummary, signature: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("old_lemma_count: {}\n", diff.old_lemma_count));
    output.push_str(&format!("new_lemma_count: {}\n", diff.new_lemma_count));
    output.push_str(&format!("added: {}\n", diff.added));
    output.push_str(&format!("removed: {}\n", diff.removed));
    output.push_str(&format!("tokens_changed: {}\n", diff.tokens_changed));
    output.push_str(&format!("signature: {}\n", signature));
    output
}

fn render_text(report: &RebuildReport) -> String {
    let mut output = banner("LEMMA REBUILD");

    output.push_str(&format!("tokens: {}\n", report.token_count));
    output.push_str(&format!("mapped_tokens: {}\n", report.mapped_tokens));
    output.push_str(&render_diff(&report.diff, &report.signature));
    output.push('\n');

    match &report.drift {
        DriftCheck::NoHistory => output.push_str("drift: none (no previous generation)\n"),
        DriftCheck::Match { .. } => output.push_str("drift: none (matches latest generation)\n"),
        DriftCheck::Drift { recorded, computed } => {
            output.push_str("drift: DETECTED\n");
            output.push_str(&format!("  recorded: {}\n", recorded));
            output.push_str(&format!("  computed: {}\n", computed));
        }
    }

    match report.outcome {
        Outcome::DriftAborted => output.push_str(
            "\nWARNING: Signature differs from latest metadata. Aborted without changes. Use --force to proceed.\n",
        ),
        Outcome::DryRun => output.push_str("\nDry-run complete. No database changes made.\n"),
        Outcome::Cancelled => output.push_str("\nCancelled. No database changes made.\n"),
        Outcome::Committed | Outcome::DeterminismFailed => {
            if let Some(meta) = &report.committed {
                output.push_str("\nRebuild committed.\n");
                output.push_str(&format!("final_lemma_count: {}\n", meta.lemma_count));
                output.push_str(&format!("final_signature: {}\n", meta.signature));
                output.push_str(&format!("built_at: {}\n", meta.built_at));
            }
            if let Some(v) = report.verification.as_ref().filter(|v| !v.passed()) {
                output.push_str(
                    "\nWARNING: Determinism check failed after rebuild; re-derivation does not reproduce the committed generation.\n",
                );
                output.push_str(&format!(
                    "  committed: {} ({} lemmas)\n",
                    v.committed_signature, v.committed_lemma_count
                ));
                output.push_str(&format!(
                    "  rederived: {} ({} lemmas)\n",
                    v.rederived_signature, v.rederived_lemma_count
                ));
                output.push_str(&format!("  read back: {}\n", v.readback_signature));
            }
        }
    }

    output
}
