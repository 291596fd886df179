use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Fully resolved run configuration. `signature_url` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub content_url: String,
    pub signature_url: String,
    pub max_bytes: u64,
    pub download_timeout: Duration,
    pub execution_timeout: Duration,
    pub shell: String,
    pub show_signer: bool,
    pub execute: bool,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Content,
    Signature,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Content => f.write_str("content"),
            ResourceKind::Signature => f.write_str("signature"),
        }
    }
}

/// A response body read up to its size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedBody {
    pub kind: ResourceKind,
    pub bytes: Vec<u8>,
    /// The server had more bytes than the limit allowed.
    pub truncated: bool,
}

/// Content that passed signature verification, plus who signed it.
///
/// Only the verifier constructs this, and only on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayload {
    pub content: Vec<u8>,
    pub signers: Vec<String>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// `None` when the child was ended by a signal.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub content_url: String,
    pub signature_url: String,
    pub bytes: usize,
    pub sha256: String,
    pub truncated: bool,
    pub signers: Vec<String>,
    pub execute: bool,
}
