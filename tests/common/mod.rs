//! Shared helpers for the integration suite

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary install directory the launcher binary is pointed at.
pub struct TestInstall {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root: PathBuf,
    install_dir: PathBuf,
}

impl TestInstall {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();
        let install_dir = root.join("install");
        fs::create_dir_all(&install_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            root,
            install_dir,
        })
    }

    /// Scratch space outside the install directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> &Path {
        &self.install_dir
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.install_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn write_entry_point(&self) -> Result<()> {
        self.write("gui_qr_print_service.py", "print('QR Print Client')\n")
    }

    /// The launcher binary with `--install-dir` set and a deterministic environment.
    pub fn launcher(&self) -> Command {
        let mut cmd = launcher_cmd();
        cmd.arg("--install-dir").arg(&self.install_dir);
        cmd
    }
}

/// The launcher binary with colors, spinners and inherited overrides disabled.
pub fn launcher_cmd() -> Command {
    let mut cmd = Command::cargo_bin("qrprint-launcher").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("QRPRINT_NO_PROGRESS", "1")
        .env_remove("QRPRINT_INSTALL_DIR")
        .env_remove("RUST_LOG");
    cmd
}
