/// Armored public key ring baked in by `build.rs`.
pub const EMBEDDED_KEYRING: &str = include_str!(concat!(env!("OUT_DIR"), "/trusted-keyring.asc"));

pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_SHELL: &str = "bash";

/// Armored detached signatures are a few hundred bytes; anything near this is hostile.
pub const MAX_SIGNATURE_BYTES: u64 = 64 * 1024;

pub const SIGNATURE_SUFFIX: &str = ".asc";

/// Read by the CLI to override the default shell.
pub const ENV_SHELL_OVERRIDE: &str = "URL_SHELL";
/// Handed to the script: absolute path of the running binary.
pub const ENV_EXEC_PATH: &str = "URL_SHELL_EXEC";
/// Handed to the script: shell the script runs under.
pub const ENV_SHELL_NAME: &str = "URL_SHELL_NAME";
