use crate::services::fetch::FetchError;
use crate::services::sandbox::ExecutionError;
use crate::services::trust::{KeyRingError, SignatureError};

/// Problems detected before any network traffic.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    KeyRing(#[from] KeyRingError),
    #[error("invalid {what} URL {url:?}: {reason}")]
    InvalidUrl {
        what: &'static str,
        url: String,
        reason: String,
    },
    #[error("--max-bytes must be greater than zero")]
    ZeroMaxBytes,
    #[error("cannot get full path of the current program: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            PipelineError::Fetch(FetchError::Cancelled)
                | PipelineError::Execution(ExecutionError::Cancelled)
        )
    }

    /// Process exit status for this failure.
    ///
    /// A script that ran and exited non-zero hands its own code through;
    /// everything else is a plain failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Execution(ExecutionError::NonZeroExit { outcome }) => outcome
                .exit_code
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ExecutionOutcome;
    use std::time::Duration;

    fn non_zero(code: Option<i32>) -> PipelineError {
        PipelineError::Execution(ExecutionError::NonZeroExit {
            outcome: ExecutionOutcome {
                exit_code: code,
                timed_out: false,
            },
        })
    }

    #[test]
    fn child_exit_code_is_propagated() {
        assert_eq!(non_zero(Some(3)).exit_code(), 3);
        assert_eq!(non_zero(Some(137)).exit_code(), 137);
    }

    #[test]
    fn unrepresentable_codes_fall_back_to_one() {
        assert_eq!(non_zero(None).exit_code(), 1);
        assert_eq!(non_zero(Some(-1)).exit_code(), 1);
        assert_eq!(non_zero(Some(256)).exit_code(), 1);
    }

    #[test]
    fn timeouts_and_signature_failures_are_plain_failures() {
        let timed_out = PipelineError::Execution(ExecutionError::TimedOut {
            limit: Duration::from_secs(1),
            outcome: ExecutionOutcome {
                exit_code: Some(0),
                timed_out: true,
            },
        });
        assert_eq!(timed_out.exit_code(), 1);
        assert_eq!(
            PipelineError::Signature(SignatureError::Mismatch).exit_code(),
            1
        );
        assert_eq!(PipelineError::Config(ConfigError::ZeroMaxBytes).exit_code(), 1);
    }

    #[test]
    fn cancellation_is_recognised_in_every_stage() {
        assert!(PipelineError::Fetch(FetchError::Cancelled).is_cancelled());
        assert!(PipelineError::Execution(ExecutionError::Cancelled).is_cancelled());
        assert!(!PipelineError::Signature(SignatureError::Mismatch).is_cancelled());
    }
}
