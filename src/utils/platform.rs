//! Platform-specific helpers
//!
//! Executable names and interpreter layouts differ between Windows and Unix.
//! Everything that branches on the platform lives here so the rest of the crate
//! stays free of `cfg!` checks.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the platform-specific git command name.
///
/// - **Windows**: `git.exe`
/// - **Unix-like**: `git`
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Interpreter names tried, in order, when no list is configured.
#[must_use]
pub fn default_interpreters() -> Vec<String> {
    let mut names = vec!["python3".to_string(), "python".to_string()];
    if is_windows() {
        names.push("py".to_string());
    }
    names
}

/// Path of the interpreter inside a virtual environment.
///
/// - **Windows**: `<venv>\Scripts\python.exe`
/// - **Unix-like**: `<venv>/bin/python`
#[must_use]
pub fn venv_python_path(venv_dir: &Path) -> PathBuf {
    if is_windows() {
        venv_dir.join("Scripts").join("python.exe")
    } else {
        venv_dir.join("bin").join("python")
    }
}

/// Directory containing the running executable.
///
/// This is the default install directory: the launcher ships next to the
/// application it bootstraps.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("Executable path has no parent directory: {}", exe.display()))
}
