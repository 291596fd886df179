use crate::domain::constants::{ENV_EXEC_PATH, ENV_SHELL_NAME};
use crate::domain::models::{Request, VerifiedPayload};
use crate::error::{ConfigError, PipelineError};
use crate::services::fetch::{build_client, fetch_both};
use crate::services::output::{report_verified, verify_report};
use crate::services::sandbox::{execute, ExecutionError, ExecutionRequest};
use crate::services::trust::TrustedKeyRing;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Stages of a run. Strictly linear; any failure ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Verifying,
    ReportingSigners,
    Executing,
    Done,
}

/// Supplies the values announced to the script. Resolved once per run.
pub trait Announce: Send + Sync {
    fn current_exe(&self) -> std::io::Result<PathBuf>;
}

pub struct ProcessAnnounce;

impl Announce for ProcessAnnounce {
    fn current_exe(&self) -> std::io::Result<PathBuf> {
        std::env::current_exe()
    }
}

/// Cancels `cancel` on Ctrl-C. The returned handle stops watching when aborted.
pub fn watch_interrupt(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received interrupt, cancelling work in flight");
            cancel.cancel();
        }
    })
}

pub async fn handle_run(
    request: &Request,
    ring: &TrustedKeyRing,
    announce: &dyn Announce,
    cancel: &CancellationToken,
) -> anyhow::Result<Stage> {
    info!(stage = ?Stage::Fetching, url = %request.content_url, signature = %request.signature_url);
    let payload = fetch_and_verify(request, ring, cancel).await?;
    info!(stage = ?Stage::Verifying, bytes = payload.content.len(), signers = ?payload.signers, "signature verified");

    if request.show_signer || request.json {
        info!(stage = ?Stage::ReportingSigners);
        let report = verify_report(
            &request.content_url,
            &request.signature_url,
            &payload,
            request.execute,
        );
        if let Err(e) = report_verified(request.json, request.show_signer, report) {
            warn!(error = %e, "could not write verification report");
        }
    }

    if !request.execute {
        info!("execution disabled, stopping after verification");
        return Ok(Stage::Verifying);
    }

    info!(stage = ?Stage::Executing, shell = %request.shell, limit = ?request.execution_timeout);
    run_payload(request, payload, announce, cancel).await?;
    Ok(Stage::Done)
}

/// FETCHING then VERIFYING. Nothing from a failed verification escapes.
pub async fn fetch_and_verify(
    request: &Request,
    ring: &TrustedKeyRing,
    cancel: &CancellationToken,
) -> Result<VerifiedPayload, PipelineError> {
    let client = build_client(request.download_timeout).map_err(ConfigError::HttpClient)?;
    let pair = fetch_both(&client, request, cancel).await?;
    let (content, signature) = pair.read_bodies(cancel).await?;
    let payload = ring.verify(content, &signature.bytes, request.max_bytes)?;
    Ok(payload)
}

async fn run_payload(
    request: &Request,
    payload: VerifiedPayload,
    announce: &dyn Announce,
    cancel: &CancellationToken,
) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        warn!("interrupted after verification, script not started");
        return Err(ExecutionError::Cancelled.into());
    }
    let exe = announce.current_exe().map_err(ConfigError::CurrentExe)?;
    let env = vec![
        (ENV_EXEC_PATH.to_string(), exe.into_os_string()),
        (ENV_SHELL_NAME.to_string(), OsString::from(&request.shell)),
    ];
    execute(
        ExecutionRequest {
            script: &payload.content,
            shell: &request.shell,
            timeout: request.execution_timeout,
            env,
        },
        cancel,
    )
    .await
    .inspect_err(|e| {
        if let Some(outcome) = e.outcome() {
            info!(?outcome, "shell did not succeed");
        }
    })?;
    Ok(())
}
