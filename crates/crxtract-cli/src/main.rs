//! Crxtract CLI - Command-line utility for secure extension package
//! fetching and extraction.

mod cli;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose, cli.quiet);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Fetch(args) => commands::fetch::execute(args, &*formatter).await,
        cli::Commands::Inspect(args) => commands::inspect::execute(args, &*formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}

/// Routes core diagnostics to stderr at a level matching the CLI flags;
/// `RUST_LOG` still wins when set.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else if verbose {
        "warn,crxtract_core=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
