//! lemmaforge CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lemmaforge::cli::Commands;
use lemmaforge::commands::{run_history, run_rebuild, CommandContext, CommandOutput};
use lemmaforge::{Cli, LemmaforgeConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            print!("{}", output.text);
            ExitCode::from(output.status)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> lemmaforge::Result<CommandOutput> {
    let config = LemmaforgeConfig::load(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.logging.level);

    let ctx = CommandContext::new(cli.format, cli.verbose, config);
    match &cli.command {
        Commands::Rebuild(args) => run_rebuild(args, &ctx),
        Commands::History(args) => run_history(args, &ctx),
    }
}

/// Logs go to stderr; stdout carries command output only.
/// RUST_LOG wins over --verbose, which wins over the configured level.
fn init_logging(verbose: bool, configured_level: &str) {
    let default_level = if verbose { "debug" } else { configured_level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lemmaforge={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
