//! `parsecache` diagnostics binary

mod cli;
mod status;
mod tracing;

use crate::cli::{Cli, Commands};
use crate::tracing::TracingConfig;
use clap::Parser;

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    if let Err(error) = run_main().await {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> miette::Result<()> {
    let cli = Cli::parse();

    crate::tracing::init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.log_level.into(),
        filter: None,
    })?;

    match cli.command {
        Commands::Status(args) => status::execute(&args).await,
    }
}
