//! Case-outcome - Main Entry Point
//!
//! Runs the train, tune or baseline pipeline from the command line.

use case_outcome::cli::{self, Cli};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "case_outcome=info".into()),
        )
        .init();

    cli::run(Cli::parse())
}
