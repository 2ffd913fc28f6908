//! Type-safe Git command builder for consistent command execution
//!
//! Every git invocation the launcher makes goes through [`GitCommand`], so
//! timeouts, logging and error mapping behave the same for the update check,
//! the pull and the status report.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::{GIT_PULL_TIMEOUT, GIT_QUERY_TIMEOUT};
use crate::core::LauncherError;
use crate::utils::platform::get_git_command;

/// Builder for constructing and executing Git commands.
///
/// # Examples
///
/// ```rust,no_run
/// use qrprint_launcher::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let branch = GitCommand::current_branch()
///     .current_dir("/opt/qr-print-client")
///     .execute_stdout()
///     .await?;
///
/// GitCommand::pull("origin", &branch)
///     .current_dir("/opt/qr-print-client")
///     .with_context("self-update")
///     .execute_success()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: 30 seconds (local queries); network builders set their own
/// - **Output capture**: Always; the launcher never streams git output
/// - **Working directory**: passed to git as `-C <dir>` when set
/// - **Environment**: Inherits from parent process
pub struct GitCommand {
    /// Command arguments to pass to Git (e.g., ["fetch", "origin"])
    args: Vec<String>,

    /// Working directory, passed as `-C`
    current_dir: Option<PathBuf>,

    /// Environment variables to set for the Git process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for command completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional context string included in log lines
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            timeout_duration: Some(GIT_QUERY_TIMEOUT),
            context: None,
        }
    }
}

impl GitCommand {
    /// Creates a new Git command builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory for Git command execution.
    ///
    /// The directory is handed to git with `-C`, which keeps the launcher's own
    /// working directory untouched.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument to the Git command.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to the Git command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable for the Git command execution.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context label included in log messages.
    ///
    /// ```text
    /// (update-check) Executing command: git -C /opt/qr fetch origin
    /// ```
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The git subcommand, skipping a leading `-C <dir>`.
    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    /// Execute the command and return the output
    ///
    /// A non-zero exit status or an expired timeout becomes
    /// [`LauncherError::GitCommandError`]. A missing git executable surfaces as
    /// an I/O error with context.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());

        cmd.args(&full_args);
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        let label = self.context.as_deref().map(|c| format!("({c}) ")).unwrap_or_default();
        tracing::debug!(
            target: "git",
            "{}Executing command: {} {}",
            label,
            git_command,
            full_args.join(" ")
        );

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result.context(format!("Failed to execute git {}", full_args.join(" ")))?
            } else {
                tracing::warn!(
                    target: "git",
                    "Command timed out after {} seconds: git {}",
                    duration.as_secs(),
                    full_args.join(" ")
                );
                return Err(LauncherError::GitCommandError {
                    operation: self.operation(),
                    stderr: format!(
                        "Git command timed out after {} seconds. This may indicate:\n\
                        - Network connectivity issues\n\
                        - Authentication prompts waiting for input\n\
                        Try running the command manually: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    ),
                }
                .into());
            }
        } else {
            output_future.await.context(format!("Failed to execute git {}", full_args.join(" ")))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);

            tracing::debug!(
                target: "git",
                "{}Command failed with exit code: {:?}",
                label,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "Error: {}", stderr.trim());
            }

            return Err(LauncherError::GitCommandError {
                operation: self.operation(),
                stderr: if stderr.is_empty() {
                    stdout.to_string()
                } else {
                    stderr.to_string()
                },
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stdout.is_empty() {
            tracing::debug!(target: "git", "{}{}", label, stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "git", "{}{}", label, stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "git::perf",
                "{}Git {} took {:.2}s",
                label,
                self.operation(),
                elapsed.as_secs_f64()
            );
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(
                target: "git::perf",
                "{}Git {} took {}ms",
                label,
                self.operation(),
                elapsed.as_millis()
            );
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute the command and return only stdout as a trimmed string
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute the command and check for success
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Output from a Git command
#[derive(Debug)]
pub struct GitCommandOutput {
    /// Standard output from the Git command
    pub stdout: String,
    /// Standard error output from the Git command
    pub stderr: String,
}

// Convenience builders for the operations the launcher performs

impl GitCommand {
    /// `git fetch <remote>`
    ///
    /// Terminal prompts are disabled so a remote asking for credentials fails
    /// fast instead of hanging until the timeout.
    pub fn fetch(remote: &str) -> Self {
        Self::new().args(["fetch", remote]).env("GIT_TERMINAL_PROMPT", "0")
    }

    /// `git pull <remote> <branch>`
    pub fn pull(remote: &str, branch: &str) -> Self {
        Self::new()
            .args(["pull", remote, branch])
            .env("GIT_TERMINAL_PROMPT", "0")
            .with_timeout(Some(GIT_PULL_TIMEOUT))
    }

    /// Current branch name; prints `HEAD` when detached.
    pub fn current_branch() -> Self {
        Self::new().args(["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Create a command to get the current commit hash
    pub fn current_commit() -> Self {
        Self::new().args(["rev-parse", "HEAD"])
    }

    /// Number of commits reachable from `upstream` but not from `HEAD`.
    pub fn rev_list_count(upstream: &str) -> Self {
        Self::new().args(["rev-list".to_string(), "--count".to_string(), format!("HEAD..{upstream}")])
    }

    /// Paths changed between two commits.
    pub fn diff_name_only(from: &str, to: &str) -> Self {
        Self::new().args(["diff", "--name-only", from, to])
    }

    /// Absolute path of the work tree containing the directory, searching parents.
    pub fn show_toplevel() -> Self {
        Self::new().args(["rev-parse", "--show-toplevel"])
    }

    /// `git --version`
    pub fn version() -> Self {
        Self::new().arg("--version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_basic() {
        let cmd = GitCommand::new().arg("status").arg("--short");
        assert_eq!(cmd.args, vec!["status", "--short"]);
    }

    #[tokio::test]
    async fn test_git_version_produces_stdout() {
        let output = GitCommand::version().execute().await.unwrap();
        assert!(output.stdout.starts_with("git version"));
    }

    #[test]
    fn test_command_builder_with_dir() {
        let cmd = GitCommand::new().current_dir("/tmp/repo").arg("status");
        assert_eq!(cmd.current_dir, Some(PathBuf::from("/tmp/repo")));
    }

    #[test]
    fn test_fetch_builder_disables_prompts() {
        let cmd = GitCommand::fetch("origin");
        assert_eq!(cmd.args, vec!["fetch", "origin"]);
        assert!(cmd.env_vars.contains(&("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())));
    }

    #[test]
    fn test_pull_builder_uses_long_timeout() {
        let cmd = GitCommand::pull("origin", "main");
        assert_eq!(cmd.args, vec!["pull", "origin", "main"]);
        assert_eq!(cmd.timeout_duration, Some(GIT_PULL_TIMEOUT));
    }

    #[test]
    fn test_rev_list_count_builder() {
        let cmd = GitCommand::rev_list_count("origin/main");
        assert_eq!(cmd.args, vec!["rev-list", "--count", "HEAD..origin/main"]);
    }

    #[tokio::test]
    async fn test_failed_command_maps_to_git_command_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = GitCommand::current_commit().current_dir(temp.path()).execute().await.unwrap_err();

        match err.downcast_ref::<LauncherError>() {
            Some(LauncherError::GitCommandError {
                operation,
                stderr,
            }) => {
                assert_eq!(operation, "rev-parse");
                assert!(!stderr.is_empty());
            }
            other => panic!("Expected GitCommandError, got {other:?}"),
        }
    }
}
