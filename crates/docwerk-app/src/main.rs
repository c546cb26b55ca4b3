// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docwerk: local document transformation from the command line.
//
// Entry point. Initialises logging, loads the engine configuration, runs one
// job and prints a JSON summary on stdout. Logs go to stderr.

mod cli;
mod commands;
mod config_dir;
mod error;
mod page_list;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use docwerk_core::human_errors::humanize_failure;
use docwerk_engine::JobCoordinator;

use cli::Cli;
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            err.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = config_dir::load_config(cli.config.as_deref())?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Docwerk starting");

    let plan = commands::plan(cli.command)?;
    let coordinator = JobCoordinator::new(config);
    let summary = runner::execute(&coordinator, plan).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn report(err: &CliError) {
    match err {
        CliError::Job(failure) => {
            let human = humanize_failure(failure);
            eprintln!("error [{}]: {}", failure.code, human.message);
            eprintln!("  {}", failure.message);
            eprintln!("  {}", human.suggestion);
        }
        other => eprintln!("error: {other}"),
    }
}
