//! History command handler - List recorded generations

use crate::cli::{HistoryArgs, OutputFormat};
use crate::commands::{banner, to_json, CommandContext, CommandOutput};
use crate::error::Result;
use crate::store::{self, RebuildMetadata};

/// Run the history command
pub fn run_history(args: &HistoryArgs, ctx: &CommandContext) -> Result<CommandOutput> {
    let db_path = ctx.config.database_path(args.db.as_ref());
    let conn = store::open_database(&db_path)?;
    let history = store::metadata_history(&conn, args.limit)?;

    let text = match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "_type": "history",
            "database": db_path.to_string_lossy(),
            "generations": history,
        })),
        OutputFormat::Text => render_text(&history),
    };

    Ok(CommandOutput::success(text))
}

fn render_text(history: &[RebuildMetadata]) -> String {
    let mut output = banner("LEMMA GENERATIONS");

    if history.is_empty() {
        output.push_str("No rebuild has been committed yet.\n");
        return output;
    }

    for meta in history {
        output.push_str(&format!("- built_at: {}\n", meta.built_at));
        output.push_str(&format!("  lemma_version: {}\n", meta.lemma_version));
        output.push_str(&format!("  lemma_count: {}\n", meta.lemma_count));
        output.push_str(&format!("  signature: {}\n", meta.signature));
        if let Some(notes) = &meta.notes {
            output.push_str(&format!("  notes: {}\n", notes));
        }
    }

    output
}
