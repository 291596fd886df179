use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;

mod cli;
mod commands;
mod domain;
mod error;
mod services;

use cli::Cli;
use commands::{handle_run, watch_interrupt, ProcessAnnounce};
use domain::constants::EMBEDDED_KEYRING;
use error::{ConfigError, PipelineError};
use services::trust::TrustedKeyRing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let pipeline = err.downcast_ref::<PipelineError>();
            match pipeline {
                Some(e) if e.is_cancelled() => eprintln!("url-shell: interrupted: {e}"),
                Some(e) => eprintln!("url-shell: {e}"),
                None => eprintln!("url-shell: {err:#}"),
            }
            ExitCode::from(pipeline.map(PipelineError::exit_code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let request = cli.into_request().map_err(PipelineError::from)?;
    let ring = TrustedKeyRing::from_armored(EMBEDDED_KEYRING)
        .map_err(|e| PipelineError::from(ConfigError::from(e)))?;
    debug!(keys = ring.len(), identities = ?ring.identities(), "trusted key ring loaded");

    let cancel = CancellationToken::new();
    let watcher = watch_interrupt(cancel.clone());
    let result = handle_run(&request, &ring, &ProcessAnnounce, &cancel).await;
    watcher.abort();
    result.map(|_| ())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
