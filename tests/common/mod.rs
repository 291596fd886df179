#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use httpmock::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub workdir: PathBuf,
    pub server: MockServer,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let workdir = tmp.path().to_path_buf();
        Self {
            _tmp: tmp,
            workdir,
            server: MockServer::start(),
        }
    }

    /// Binary with a clean environment: no shell override, quiet logs.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("url-shell");
        cmd.current_dir(&self.workdir)
            .env_remove("URL_SHELL")
            .env_remove("URL_SHELL_EXEC")
            .env_remove("URL_SHELL_NAME")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn url(&self, path: &str) -> String {
        self.server.url(path)
    }

    pub fn serve(&self, path: &str, body: impl AsRef<[u8]>) {
        let body = body.as_ref().to_vec();
        self.server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).body(body);
        });
    }

    pub fn serve_status(&self, path: &str, status: u16) {
        self.server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(status);
        });
    }

    /// Serves `fixtures/<name>` and its signature at `/<name>` and `/<name>.asc`.
    pub fn serve_signed(&self, name: &str) -> String {
        self.serve(&format!("/{name}"), fixture(name));
        self.serve(&format!("/{name}.asc"), fixture(&format!("{name}.asc")));
        self.url(&format!("/{name}"))
    }
}

pub fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read fixture {}: {e}", path.display()))
}
