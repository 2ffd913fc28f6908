//! Self-update through git
//!
//! The install directory is a git checkout. On every start the launcher:
//!
//! 1. [`UpdateChecker`] - fetches the remote and counts the commits the current
//!    branch is behind. Every failure here degrades to "up to date".
//! 2. [`UpdateApplier`] - pulls when behind and reports whether the pull touched
//!    the launcher's own files. The caller restarts through a
//!    [`restart::Restarter`] in that case.

pub mod restart;


use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use crate::git::{CheckoutState, GitCheckout, ensure_git_available};

pub use restart::{ProcessRestarter, Restarter};

/// How far the checkout is behind its remote branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatus {
    /// Current branch, `None` when detached or unknown
    pub branch: Option<String>,
    /// Commits on the remote branch that are not local
    pub behind: u32,
}

/// Result of the update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    /// No check was possible; carries the reason
    Skipped(CheckoutState),
    /// The remote was queried (possibly unsuccessfully, which reads as 0)
    Checked(UpdateStatus),
}

impl UpdateCheck {
    /// Pending commit count, 0 when skipped.
    #[must_use]
    pub const fn behind(&self) -> u32 {
        match self {
            Self::Skipped(_) => 0,
            Self::Checked(status) => status.behind,
        }
    }
}

/// Determines whether updates are available.
pub struct UpdateChecker {
    checkout: GitCheckout,
    remote: String,
    fetch_timeout: Duration,
}

impl UpdateChecker {
    pub fn new(install_dir: &Path, remote: impl Into<String>, fetch_timeout: Duration) -> Self {
        Self {
            checkout: GitCheckout::new(install_dir),
            remote: remote.into(),
            fetch_timeout,
        }
    }

    /// Probe, fetch and count. Never fails.
    pub async fn check(&self) -> UpdateCheck {
        let state = self.checkout.probe().await;
        if state != CheckoutState::Present {
            tracing::debug!("Skipping update check: {}", state);
            return UpdateCheck::Skipped(state);
        }

        if let Err(e) = self.checkout.fetch(&self.remote, self.fetch_timeout).await {
            tracing::warn!("Could not fetch from '{}', assuming up to date: {e:#}", self.remote);
            return UpdateCheck::Checked(UpdateStatus {
                branch: None,
                behind: 0,
            });
        }

        let branch = match self.checkout.current_branch().await {
            Ok(Some(branch)) => branch,
            Ok(None) => {
                tracing::warn!("HEAD is detached, not checking for updates");
                return UpdateCheck::Checked(UpdateStatus {
                    branch: None,
                    behind: 0,
                });
            }
            Err(e) => {
                tracing::warn!("Could not determine the current branch: {e:#}");
                return UpdateCheck::Checked(UpdateStatus {
                    branch: None,
                    behind: 0,
                });
            }
        };

        let upstream = format!("{}/{}", self.remote, branch);
        let behind = match self.checkout.commits_behind(&upstream).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Could not compare with {upstream}, assuming up to date: {e:#}");
                0
            }
        };

        tracing::debug!("Branch '{}' is {} commit(s) behind {}", branch, behind, upstream);
        UpdateCheck::Checked(UpdateStatus {
            branch: Some(branch),
            behind,
        })
    }
}

/// What applying updates did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing to pull
    UpToDate,
    /// Pulled; the launcher itself is unchanged
    Updated {
        changed: BTreeSet<String>,
    },
    /// Pulled and a launcher file changed; the process must restart
    RestartRequired {
        changed: BTreeSet<String>,
    },
}

/// Whether any changed path names one of the launcher's own files.
///
/// Paths are compared by file name, so `bin/qrprint-launcher` matches
/// `qrprint-launcher`.
#[must_use]
pub fn touches_self(changed: &BTreeSet<String>, self_files: &[String]) -> bool {
    changed.iter().any(|path| {
        Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self_files.iter().any(|own| own == name))
    })
}

/// Pulls pending commits.
pub struct UpdateApplier {
    checkout: GitCheckout,
    remote: String,
    self_files: Vec<String>,
}

impl UpdateApplier {
    pub fn new(install_dir: &Path, remote: impl Into<String>, self_files: Vec<String>) -> Self {
        Self {
            checkout: GitCheckout::new(install_dir),
            remote: remote.into(),
            self_files,
        }
    }

    /// Pull when `status` is behind.
    ///
    /// A failed pull is returned as an error. A failure to list the changed
    /// files afterwards only logs a warning and skips the restart.
    pub async fn apply(&self, status: &UpdateStatus) -> Result<ApplyOutcome> {
        let branch = match (&status.branch, status.behind) {
            (Some(branch), behind) if behind > 0 => branch,
            _ => return Ok(ApplyOutcome::UpToDate),
        };

        ensure_git_available().await?;
        let before = self.checkout.current_commit().await?;

        tracing::info!("Pulling {} commit(s) from {}/{}", status.behind, self.remote, branch);
        self.checkout.pull(&self.remote, branch).await?;

        let changed = match self.checkout.changed_files(&before, "HEAD").await {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!("Could not list files changed by the update: {e:#}");
                return Ok(ApplyOutcome::Updated {
                    changed: BTreeSet::new(),
                });
            }
        };
        tracing::debug!("Files changed by the update: {:?}", changed);

        if touches_self(&changed, &self.self_files) {
            Ok(ApplyOutcome::RestartRequired {
                changed,
            })
        } else {
            Ok(ApplyOutcome::Updated {
                changed,
            })
        }
    }
}
