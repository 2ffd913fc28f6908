//! Re-launching the launcher after it updated itself
//!
//! On Unix the process image is replaced with `exec`, so a successful restart
//! never returns. On Windows a new process is started in its own console and
//! the caller exits.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use crate::core::LauncherError;

/// Starts a fresh copy of the launcher.
///
/// Returning `Ok(())` means the new process is running and the current one
/// should exit with status 0 without doing anything else.
pub trait Restarter {
    fn restart(&self) -> Result<()>;
}

/// Re-runs an executable with a fixed argument vector.
#[derive(Debug, Clone)]
pub struct ProcessRestarter {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessRestarter {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The running executable with the arguments it was started with.
    pub fn from_current_process() -> Result<Self> {
        let program = std::env::current_exe().context("Failed to get current executable path")?;
        Ok(Self::new(program, std::env::args_os().skip(1).collect()))
    }

    #[must_use]
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl Restarter for ProcessRestarter {
    #[cfg(unix)]
    fn restart(&self) -> Result<()> {
        use std::os::unix::process::CommandExt;

        tracing::info!("Re-executing {}", self.program.display());
        // exec only returns on failure
        let error = self.command().exec();
        Err(LauncherError::RestartFailed {
            reason: error.to_string(),
        }
        .into())
    }

    #[cfg(windows)]
    fn restart(&self) -> Result<()> {
        use std::os::windows::process::CommandExt;

        const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

        tracing::info!("Starting {} in a new console", self.program.display());
        self.command().creation_flags(CREATE_NEW_CONSOLE).spawn().map_err(|e| {
            LauncherError::RestartFailed {
                reason: e.to_string(),
            }
        })?;
        Ok(())
    }
}
