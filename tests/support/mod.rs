#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub struct TestVault {
    dir: TempDir,
}

impl TestVault {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        fs::create_dir_all(dir.path().join("vault")).expect("failed to create vault dir");
        Self { dir }
    }

    /// Vault root; sits next to an isolated user config home.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("vault")
    }

    pub fn write_note(&self, rel_path: &str, contents: &str) -> PathBuf {
        let path = self.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create note dir");
        }
        fs::write(&path, contents).expect("failed to write note");
        path
    }

    pub fn read_note(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("failed to read note")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        self.write_note(".taskprio.toml", contents)
    }

    pub fn exists(&self, rel_path: &str) -> bool {
        self.path().join(rel_path).exists()
    }

    /// The binary pointed at this vault, isolated from the caller's
    /// environment and user config.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskprio").expect("binary");
        cmd.env_remove("TASKPRIO_VAULT")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("HOME", self.config_home())
            .arg("--vault")
            .arg(self.path());
        cmd
    }

    fn config_home(&self) -> PathBuf {
        self.dir.path().join("home")
    }
}

pub fn parse_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("stdout is JSON")
}

pub fn note_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("failed to read note")
        .split('\n')
        .map(str::to_string)
        .collect()
}
