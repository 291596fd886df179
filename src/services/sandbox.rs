use crate::domain::models::ExecutionOutcome;
use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(thiserror::Error, Debug)]
pub enum ExecutionError {
    #[error("could not start shell {shell}: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not wait for shell {shell}: {source}")]
    Wait {
        shell: String,
        #[source]
        source: std::io::Error,
    },
    #[error("shell script has exited with an error: {}", describe_exit(.outcome))]
    NonZeroExit { outcome: ExecutionOutcome },
    #[error("shell script did not finish within {limit:?} and was killed")]
    TimedOut {
        limit: Duration,
        outcome: ExecutionOutcome,
    },
    #[error("shell script cancelled")]
    Cancelled,
}

impl ExecutionError {
    pub fn outcome(&self) -> Option<ExecutionOutcome> {
        match self {
            ExecutionError::NonZeroExit { outcome } | ExecutionError::TimedOut { outcome, .. } => {
                Some(*outcome)
            }
            _ => None,
        }
    }
}

fn describe_exit(outcome: &ExecutionOutcome) -> String {
    match outcome.exit_code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// What to run and under which limits.
#[derive(Debug)]
pub struct ExecutionRequest<'a> {
    pub script: &'a [u8],
    pub shell: &'a str,
    pub timeout: Duration,
    /// Set on the child only; the parent environment is left untouched.
    pub env: Vec<(String, OsString)>,
}

/// Runs `shell -c script` with stdout/stderr inherited, so output streams live.
///
/// A token that is already cancelled means the shell is never started.
/// Otherwise the child is killed on timeout, on cancellation, and if this
/// future is dropped. Only the shell itself is killed: processes the script
/// put in the background stay in the caller's process group and keep running.
pub async fn execute(
    request: ExecutionRequest<'_>,
    cancel: &CancellationToken,
) -> Result<ExecutionOutcome, ExecutionError> {
    if cancel.is_cancelled() {
        return Err(ExecutionError::Cancelled);
    }
    let mut child = Command::new(request.shell)
        .arg("-c")
        .arg(script_arg(request.script))
        .envs(request.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExecutionError::Spawn {
            shell: request.shell.to_string(),
            source,
        })?;
    debug!(shell = request.shell, pid = child.id(), "shell started");

    let waited = tokio::select! {
        status = child.wait() => status,
        _ = tokio::time::sleep(request.timeout) => {
            warn!(limit = ?request.timeout, "execution time limit reached, killing shell");
            let status = terminate(&mut child).await;
            let outcome = ExecutionOutcome {
                exit_code: status.and_then(|s| exit_code(&s)),
                timed_out: true,
            };
            return Err(ExecutionError::TimedOut { limit: request.timeout, outcome });
        }
        _ = cancel.cancelled() => {
            terminate(&mut child).await;
            return Err(ExecutionError::Cancelled);
        }
    };
    let status = waited.map_err(|source| ExecutionError::Wait {
        shell: request.shell.to_string(),
        source,
    })?;

    let outcome = ExecutionOutcome {
        exit_code: exit_code(&status),
        timed_out: false,
    };
    debug!(shell = request.shell, ?outcome, "shell finished");
    if outcome.success() {
        Ok(outcome)
    } else {
        Err(ExecutionError::NonZeroExit { outcome })
    }
}

async fn terminate(child: &mut Child) -> Option<ExitStatus> {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "could not kill shell");
        return None;
    }
    child.wait().await.ok()
}

#[cfg(unix)]
fn exit_code(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| 128 + sig))
}

#[cfg(not(unix))]
fn exit_code(status: &ExitStatus) -> Option<i32> {
    status.code()
}

#[cfg(unix)]
fn script_arg(script: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(script).to_os_string()
}

#[cfg(not(unix))]
fn script_arg(script: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(script).into_owned())
}
