//! Git operations on the install directory
//!
//! The launcher is distributed as a git checkout and updates itself by pulling.
//! This module wraps the system `git` binary (through [`GitCommand`]) with the
//! handful of operations the update flow needs:
//!
//! - probing whether the install directory is a usable checkout ([`CheckoutState`])
//! - fetching the remote and counting commits the checkout is behind
//! - pulling and listing the files a pull changed
//!
//! Using the git CLI rather than an embedded library keeps the user's
//! credential helpers and SSH configuration working unchanged.
//!
//! # Examples
//!
//! ```rust,no_run
//! use qrprint_launcher::git::{CheckoutState, GitCheckout};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let checkout = GitCheckout::new("/opt/qr-print-client");
//! if checkout.probe().await == CheckoutState::Present {
//!     checkout.fetch("origin", std::time::Duration::from_secs(60)).await?;
//!     if let Some(branch) = checkout.current_branch().await? {
//!         let behind = checkout.commits_behind(&format!("origin/{branch}")).await?;
//!         println!("{behind} commits behind");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod command_builder;


use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use command_builder::{GitCommand, GitCommandOutput};

use crate::core::LauncherError;

/// Whether a directory can take part in the update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// No `.git` marker; updates are skipped silently
    Absent,
    /// A git work tree; updates are checked
    Present,
    /// A `.git` marker exists but git is missing or resolves no work tree rooted here
    Invalid,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "not a git checkout"),
            Self::Present => write!(f, "git checkout"),
            Self::Invalid => write!(f, "invalid git checkout"),
        }
    }
}

/// A git checkout rooted at the install directory.
#[derive(Debug, Clone)]
pub struct GitCheckout {
    path: PathBuf,
}

impl GitCheckout {
    /// Wrap a directory. Nothing is checked until [`probe`](Self::probe).
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The checkout root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the `.git` marker exists (a directory, or a file for linked worktrees).
    #[must_use]
    pub fn has_git_marker(&self) -> bool {
        self.path.join(".git").exists()
    }

    /// Classify the directory.
    ///
    /// Runs no git command at all when the marker is absent. A marker only
    /// counts when git resolves the work tree to this directory itself; an
    /// unusable `.git` nested inside another checkout is `Invalid`, never the
    /// parent repository.
    pub async fn probe(&self) -> CheckoutState {
        if !self.has_git_marker() {
            return CheckoutState::Absent;
        }

        if !is_git_installed().await {
            tracing::warn!("Found .git in {} but git is not installed", self.path.display());
            return CheckoutState::Invalid;
        }

        let toplevel = match GitCommand::show_toplevel().current_dir(&self.path).execute_stdout().await {
            Ok(toplevel) => toplevel,
            Err(e) => {
                tracing::warn!("{} has a .git marker but git rejected it: {e}", self.path.display());
                return CheckoutState::Invalid;
            }
        };

        match (tokio::fs::canonicalize(&toplevel).await, tokio::fs::canonicalize(&self.path).await) {
            (Ok(toplevel), Ok(own)) if toplevel == own => CheckoutState::Present,
            _ => {
                tracing::warn!(
                    "{} has a .git marker but git resolved the work tree to '{}'",
                    self.path.display(),
                    toplevel
                );
                CheckoutState::Invalid
            }
        }
    }

    /// `git fetch <remote>` with output captured.
    pub async fn fetch(&self, remote: &str, timeout: Duration) -> Result<()> {
        GitCommand::fetch(remote)
            .current_dir(&self.path)
            .with_timeout(Some(timeout))
            .with_context("update-check")
            .execute_success()
            .await
    }

    /// Current branch, or `None` when HEAD is detached.
    pub async fn current_branch(&self) -> Result<Option<String>> {
        let branch = GitCommand::current_branch().current_dir(&self.path).execute_stdout().await?;
        if branch.is_empty() || branch == "HEAD" {
            Ok(None)
        } else {
            Ok(Some(branch))
        }
    }

    /// Full hash of the commit HEAD points at.
    pub async fn current_commit(&self) -> Result<String> {
        GitCommand::current_commit().current_dir(&self.path).execute_stdout().await
    }

    /// Commits reachable from `upstream` (e.g. `origin/main`) but not from HEAD.
    pub async fn commits_behind(&self, upstream: &str) -> Result<u32> {
        let count = GitCommand::rev_list_count(upstream).current_dir(&self.path).execute_stdout().await?;
        count.parse::<u32>().with_context(|| format!("Unexpected rev-list output: '{count}'"))
    }

    /// `git pull <remote> <branch>`.
    ///
    /// Any failure becomes [`LauncherError::UpdateApplyFailed`] carrying git's
    /// error output.
    pub async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        GitCommand::pull(remote, branch)
            .current_dir(&self.path)
            .with_context("self-update")
            .execute_success()
            .await
            .map_err(|e| {
                let reason = match e.downcast_ref::<LauncherError>() {
                    Some(LauncherError::GitCommandError {
                        stderr,
                        ..
                    }) => stderr.clone(),
                    _ => format!("{e:#}"),
                };
                LauncherError::UpdateApplyFailed {
                    branch: branch.to_string(),
                    reason,
                }
                .into()
            })
    }

    /// Paths changed between two commits, relative to the checkout root.
    pub async fn changed_files(&self, from: &str, to: &str) -> Result<BTreeSet<String>> {
        let output = GitCommand::diff_name_only(from, to).current_dir(&self.path).execute_stdout().await?;
        Ok(output.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
    }
}

/// Checks if Git is installed and accessible on the system.
pub async fn is_git_installed() -> bool {
    GitCommand::version().execute().await.is_ok()
}

/// Ensures Git is available, returning [`LauncherError::GitNotFound`] otherwise.
pub async fn ensure_git_available() -> Result<()> {
    if !is_git_installed().await {
        return Err(LauncherError::GitNotFound.into());
    }
    Ok(())
}
