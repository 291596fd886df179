use crate::domain::models::{JsonOut, VerifiedPayload, VerifyReport};
use serde::Serialize;
use std::io::Write;

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> Vec<String>,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        writeln!(
            out,
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        )?;
    } else {
        for line in row(&data) {
            writeln!(out, "{line}")?;
        }
    }
    // The script inherits stdout next; don't let our lines trail its output.
    out.flush()?;
    Ok(())
}

pub fn signer_lines(signers: &[String]) -> Vec<String> {
    signers
        .iter()
        .map(|name| format!("Downloaded content was signed by: {name}"))
        .collect()
}

/// Prints whatever the run asked to see about the verified payload.
///
/// Purely observational: nothing here decides whether the script runs.
pub fn report_verified(
    json: bool,
    show_signer: bool,
    report: VerifyReport,
) -> anyhow::Result<()> {
    if !json && !show_signer {
        return Ok(());
    }
    print_one(json, report, |r| signer_lines(&r.signers))
}

pub fn verify_report(
    content_url: &str,
    signature_url: &str,
    payload: &VerifiedPayload,
    execute: bool,
) -> VerifyReport {
    VerifyReport {
        content_url: content_url.to_string(),
        signature_url: signature_url.to_string(),
        bytes: payload.content.len(),
        sha256: crate::services::trust::content_digest(&payload.content),
        truncated: payload.truncated,
        signers: payload.signers.clone(),
        execute,
    }
}
