//! Builder for running interpreter subprocesses
//!
//! [`ProcessCommand`] mirrors [`crate::git::command_builder::GitCommand`] for
//! everything that is not git: `python --version`, `python -m venv`, pip and
//! the application itself. Unlike the git builder it does not turn a non-zero
//! exit into an error. Callers decide what a failed pip run means.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;

/// Builder for a single subprocess invocation.
pub struct ProcessCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout_duration: Option<Duration>,
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Whether the process exited with status 0
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// The last `n` non-empty lines of stderr, for logging failures.
    #[must_use]
    pub fn stderr_tail(&self, n: usize) -> String {
        let lines: Vec<&str> = self.stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

impl ProcessCommand {
    /// Start building a command for `program`.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
            timeout_duration: None,
        }
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory of the child.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set a timeout (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Human-readable command line, used in logs.
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run to completion with output captured.
    ///
    /// Fails only when the process cannot be started or the timeout expires.
    pub async fn output(self) -> Result<ProcessOutput> {
        let cmd_line = self.display();
        tracing::debug!("Executing command: {}", cmd_line);

        let mut cmd = self.command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output_future = cmd.output();
        let output = match self.timeout_duration {
            Some(duration) => timeout(duration, output_future)
                .await
                .with_context(|| {
                    format!("Command timed out after {} seconds: {cmd_line}", duration.as_secs())
                })?
                .with_context(|| format!("Failed to execute {cmd_line}"))?,
            None => output_future.await.with_context(|| format!("Failed to execute {cmd_line}"))?,
        };

        let result = ProcessOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        tracing::debug!("Command exited with {:?}: {}", result.code, cmd_line);
        Ok(result)
    }

    /// Run to completion with stdio inherited from the launcher.
    ///
    /// The child shares the terminal, so Ctrl-C reaches it as well. The
    /// launcher ignores the interrupt while the child runs and keeps waiting;
    /// the child decides whether to exit.
    ///
    /// Returns the exit code, `None` when the child was killed by a signal.
    pub async fn status(self) -> Result<Option<i32>> {
        let cmd_line = self.display();
        tracing::debug!("Executing command (inherited stdio): {}", cmd_line);

        let mut cmd = self.command();
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let mut child = cmd.spawn().with_context(|| format!("Failed to execute {cmd_line}"))?;
        let wait_future = wait_through_interrupts(&mut child);
        let status = match self.timeout_duration {
            Some(duration) => timeout(duration, wait_future)
                .await
                .with_context(|| {
                    format!("Command timed out after {} seconds: {cmd_line}", duration.as_secs())
                })?
                .with_context(|| format!("Failed to wait for {cmd_line}"))?,
            None => wait_future.await.with_context(|| format!("Failed to wait for {cmd_line}"))?,
        };
        Ok(status.code())
    }
}

/// Wait for `child`, absorbing Ctrl-C delivered to the launcher meanwhile.
async fn wait_through_interrupts(child: &mut Child) -> std::io::Result<ExitStatus> {
    loop {
        tokio::select! {
            status = child.wait() => return status,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => tracing::debug!("Interrupt received, waiting for the application to exit"),
                Err(e) => {
                    tracing::debug!("Cannot listen for interrupts: {e}");
                    return child.wait().await;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_program_and_args() {
        let cmd = ProcessCommand::new("python3").args(["-m", "venv", ".venv"]);
        assert_eq!(cmd.display(), "python3 -m venv .venv");
    }

    #[test]
    fn test_stderr_tail_skips_blank_lines() {
        let output = ProcessOutput {
            code: Some(1),
            success: false,
            stdout: String::new(),
            stderr: "one\n\ntwo\nthree\n\n".to_string(),
        };
        assert_eq!(output.stderr_tail(2), "two\nthree");
        assert_eq!(output.stderr_tail(10), "one\ntwo\nthree");
    }

    #[tokio::test]
    async fn test_output_does_not_fail_on_nonzero_exit() {
        let output = ProcessCommand::new("git").arg("definitely-not-a-subcommand").output().await.unwrap();
        assert!(!output.success);
        assert_ne!(output.code, Some(0));
        assert!(!output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let result = ProcessCommand::new("/nonexistent/qrprint/python").output().await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to execute"));
    }
}
