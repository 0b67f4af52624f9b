//! Command modules for the lemmaforge CLI
//!
//! Each command module implements a single top-level command:
//! - `rebuild` - Guarded, transactional lemma layer rebuild
//! - `history` - List recorded generations
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format and configuration.

pub mod history;
pub mod rebuild;

pub use history::run_history;
pub use rebuild::run_rebuild;

use crate::cli::OutputFormat;
use crate::config::LemmaforgeConfig;

/// Shared context passed to all command handlers
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Output format (text or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
    /// Loaded configuration
    pub config: LemmaforgeConfig,
}

impl CommandContext {
    pub fn new(format: OutputFormat, verbose: bool, config: LemmaforgeConfig) -> Self {
        Self {
            format,
            verbose,
            config,
        }
    }
}

/// Rendered command output plus the process exit code it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub status: u8,
}

impl CommandOutput {
    pub fn success(text: String) -> Self {
        Self { text, status: 0 }
    }
}

pub(crate) fn to_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

pub(crate) fn banner(title: &str) -> String {
    let rule = "═══════════════════════════════════════════════════════";
    format!("{}\n  {}\n{}\n\n", rule, title, rule)
}
