use std::env;
use std::fs;
use std::io::{Error, ErrorKind, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    println!("cargo:rerun-if-env-changed=URL_SHELL_KEYRING");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .map_err(|e| Error::new(ErrorKind::NotFound, e))?;
    let out_dir = env::var("OUT_DIR")
        .map(PathBuf::from)
        .map_err(|e| Error::new(ErrorKind::NotFound, e))?;

    // Release builds point this at the production key ring.
    let source = env::var_os("URL_SHELL_KEYRING")
        .map(PathBuf::from)
        .unwrap_or_else(|| manifest_dir.join("keys").join("dev-keyring.asc"));
    println!("cargo:rerun-if-changed={}", source.display());

    fs::copy(&source, out_dir.join("trusted-keyring.asc")).map_err(|e| {
        Error::new(
            e.kind(),
            format!("cannot embed key ring {}: {e}", source.display()),
        )
    })?;
    Ok(())
}
