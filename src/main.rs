use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use save_sync::cli::Cli;
use save_sync::{commands, logging};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match commands::run(&cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(kind = err.kind(), "command failed");
            eprintln!("{}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}
