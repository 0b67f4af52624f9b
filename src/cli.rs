//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deterministic lemma layer rebuilds
#[derive(Parser, Debug)]
#[command(name = "lemmaforge")]
#[command(about = "Rebuild a corpus lemma layer transactionally, with drift and determinism checks")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

// ============================================
// Main Commands Enum
// ============================================

/// Available subcommands for lemmaforge
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the lemma layer transactionally
    #[command(visible_alias = "rebuild-lemmas")]
    Rebuild(RebuildArgs),

    /// List recorded rebuild generations, newest first
    History(HistoryArgs),
}

// ============================================
// Rebuild Subcommand
// ============================================

/// Arguments for the rebuild command
#[derive(Args, Debug)]
pub struct RebuildArgs {
    /// Path to the corpus database
    #[arg(long, value_name = "PATH", env = "LEMMAFORGE_DB")]
    pub db: Option<PathBuf>,

    /// Lexicon file (surface<TAB>lemma); overrides the configured lexicon
    #[arg(long, value_name = "PATH")]
    pub lexicon: Option<PathBuf>,

    /// Compute diff and signature only; never write
    #[arg(long)]
    pub dry_run: bool,

    /// Proceed despite signature drift and skip the confirmation prompt
    #[arg(long)]
    pub force: bool,

    /// Keep accents and breathings when normalizing
    #[arg(long)]
    pub no_fold_diacritics: bool,
}

// ============================================
// History Subcommand
// ============================================

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Path to the corpus database
    #[arg(long, value_name = "PATH", env = "LEMMAFORGE_DB")]
    pub db: Option<PathBuf>,

    /// Maximum number of generations to show
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    #[value(alias = "pretty")]
    Text,
    /// JSON for machine parsing
    Json,
}
