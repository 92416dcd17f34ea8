use std::{fs, path::PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated home directory plus a scratch area for attachments and fixtures.
pub struct ScriptEnv {
    home: TempDir,
}

impl ScriptEnv {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("create temp home"),
        }
    }

    /// Writes `contents` under the temp home and returns its path.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.home.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.path().join("config").join("config.json")
    }

    /// The CLI in script mode, rooted at the temp home.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("storefront_cli").expect("binary exists");
        cmd.env("STOREFRONT_CLI_SCRIPT", "1")
            .env("STOREFRONT_HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}
