use crate::domain::constants::{
    DEFAULT_MAX_BYTES, DEFAULT_SHELL, ENV_SHELL_OVERRIDE, SIGNATURE_SUFFIX,
};
use crate::domain::models::Request;
use crate::error::ConfigError;
use clap::Parser;
use reqwest::Url;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "url-shell",
    version,
    about = "Download a shell script and run it only if a trusted key signed it"
)]
pub struct Cli {
    #[arg(help = "URL of the script to download")]
    pub url: String,
    #[arg(
        long,
        help = "URL of the detached PGP signature [default: <URL>.asc]"
    )]
    pub sig_url: Option<String>,
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_BYTES,
        help = "Max number of bytes to download; guards against unexpectedly large downloads"
    )]
    pub max_bytes: u64,
    #[arg(
        long,
        default_value = "60s",
        value_parser = parse_duration,
        help = "Max time to spend downloading (e.g. 30s, 2m, 1h30m)"
    )]
    pub max_download_time: Duration,
    #[arg(
        long,
        default_value = "10m",
        value_parser = parse_duration,
        help = "Max time the script may run before it is killed"
    )]
    pub max_exec_time: Duration,
    #[arg(
        long,
        env = ENV_SHELL_OVERRIDE,
        default_value = DEFAULT_SHELL,
        help = "Shell used to run the script"
    )]
    pub shell: String,
    #[arg(long, help = "Print the name of each signer of the downloaded content")]
    pub show_signer: bool,
    #[arg(long, help = "Verify only; do not run the script")]
    pub no_exec: bool,
    #[arg(long, help = "Print a machine-readable verification report")]
    pub json: bool,
}

impl Cli {
    pub fn into_request(self) -> Result<Request, ConfigError> {
        check_url("content", &self.url)?;
        let signature_url = match self.sig_url.filter(|s| !s.trim().is_empty()) {
            Some(url) => url,
            None => format!("{}{}", self.url, SIGNATURE_SUFFIX),
        };
        check_url("signature", &signature_url)?;
        if self.max_bytes == 0 {
            return Err(ConfigError::ZeroMaxBytes);
        }
        Ok(Request {
            content_url: self.url,
            signature_url,
            max_bytes: self.max_bytes,
            download_timeout: self.max_download_time,
            execution_timeout: self.max_exec_time,
            shell: self.shell,
            show_signer: self.show_signer,
            execute: !self.no_exec,
            json: self.json,
        })
    }
}

fn check_url(what: &'static str, raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        what,
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

/// Parses `90s`, `10m`, `1h30m`, `250ms` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in duration {raw:?}"))?;
        if digits == 0 {
            return Err(format!("invalid duration {raw:?}"));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration {raw:?}"))?;
        rest = &rest[digits..];
        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "h" => Duration::from_secs(value.saturating_mul(3600)),
            unit => return Err(format!("unknown unit {unit:?} in duration {raw:?}")),
        };
        total = total.saturating_add(part);
        rest = &rest[unit_len..];
    }
    Ok(total)
}
