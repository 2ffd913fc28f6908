//! Stand-in interpreter for provisioning and launch tests
//!
//! [`FakePython`] writes a POSIX shell script that answers `--version`,
//! creates a virtual environment layout for `-m venv` (copying itself in as
//! the environment's interpreter), exits with a chosen code for `-m pip`, and
//! otherwise pretends to run the application. Every invocation appends its
//! arguments to a log file so tests can assert on what was run.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Builder for a fake interpreter script.
#[derive(Debug, Clone)]
pub struct FakePython {
    version: String,
    pip_exit: i32,
    app_exit: i32,
    log: PathBuf,
}

impl FakePython {
    /// Calls are logged to `log`.
    pub fn new(log: impl Into<PathBuf>) -> Self {
        Self {
            version: "3.11.4".to_string(),
            pip_exit: 0,
            app_exit: 0,
            log: log.into(),
        }
    }

    /// Version reported by `--version`.
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Exit code of every `-m pip` call.
    pub const fn pip_exit(mut self, code: i32) -> Self {
        self.pip_exit = code;
        self
    }

    /// Exit code when running a script.
    pub const fn app_exit(mut self, code: i32) -> Self {
        self.app_exit = code;
        self
    }

    fn script(&self) -> String {
        format!(
            r#"#!/bin/sh
echo "$*" >> "{log}"
case "$1" in
  --version)
    echo "Python {version}"
    exit 0
    ;;
  -m)
    case "$2" in
      venv)
        mkdir -p "$3/bin"
        echo "home = /usr/bin" > "$3/pyvenv.cfg"
        cp "$0" "$3/bin/python"
        exit 0
        ;;
      pip)
        exit {pip_exit}
        ;;
    esac
    ;;
esac
echo "application started"
exit {app_exit}
"#,
            log = self.log.display(),
            version = self.version,
            pip_exit = self.pip_exit,
            app_exit = self.app_exit,
        )
    }

    /// Write the script to `path` and make it executable.
    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.script())
            .with_context(|| format!("Failed to write fake interpreter {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
        }

        Ok(path.to_path_buf())
    }

    /// Write a ready-made environment under `venv_dir` (`bin/python` plus `pyvenv.cfg`).
    pub fn write_venv(&self, venv_dir: &Path) -> Result<PathBuf> {
        let python = self.write(&venv_dir.join("bin").join("python"))?;
        std::fs::write(venv_dir.join("pyvenv.cfg"), "home = /usr/bin\n")?;
        Ok(python)
    }

    /// Arguments of every recorded call, one entry per invocation.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
