//! Locating a base interpreter to create the environment with
//!
//! Candidates are resolved on `PATH` with `which` in configured order. Each
//! one is asked for its version; the first that meets the minimum wins.

use anyhow::Result;
use semver::Version;
use std::path::{Path, PathBuf};

use crate::constants::INTERPRETER_PROBE_TIMEOUT;
use crate::core::LauncherError;
use crate::utils::process::ProcessCommand;

/// An interpreter found on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    /// Resolved executable path
    pub path: PathBuf,
    /// Reported version
    pub version: Version,
}

/// Parse versions the way interpreters report them.
///
/// Accepts `3`, `3.8`, `3.11.4` and pre-release suffixes such as `3.13.0rc1`
/// (the suffix is dropped). Returns `None` if there is no leading number.
#[must_use]
pub fn parse_lenient_version(text: &str) -> Option<Version> {
    let mut parts = [0u64; 3];
    let mut seen = 0;
    for (slot, part) in parts.iter_mut().zip(text.trim().split('.')) {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            break;
        }
        *slot = digits.parse().ok()?;
        seen += 1;
        if digits.len() != part.len() {
            break;
        }
    }
    (seen > 0).then(|| Version::new(parts[0], parts[1], parts[2]))
}

/// Extract the version from `python --version` output (`Python 3.11.4`).
#[must_use]
pub fn parse_python_version(output: &str) -> Option<Version> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Python "))
        .find_map(parse_lenient_version)
}

/// Searches for a suitable interpreter.
pub struct InterpreterFinder {
    candidates: Vec<String>,
    min_version: Version,
}

impl InterpreterFinder {
    pub fn new(candidates: Vec<String>, min_version: Version) -> Self {
        Self {
            candidates,
            min_version,
        }
    }

    /// Ask one executable for its version.
    pub async fn probe(path: &Path) -> Result<Version> {
        let output = ProcessCommand::new(path)
            .arg("--version")
            .with_timeout(Some(INTERPRETER_PROBE_TIMEOUT))
            .output()
            .await?;
        // Python 2 printed its version to stderr
        let combined = format!("{}\n{}", output.stdout, output.stderr);
        parse_python_version(&combined).ok_or_else(|| {
            LauncherError::Other {
                message: format!("Could not read the version of {}", path.display()),
            }
            .into()
        })
    }

    /// Candidates that resolve on `PATH`, in order, without duplicates.
    #[must_use]
    pub fn resolve_candidates(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = Vec::new();
        for name in &self.candidates {
            match which::which(name) {
                Ok(path) if !found.contains(&path) => found.push(path),
                Ok(_) => {}
                Err(e) => tracing::debug!("Interpreter candidate '{}' not found: {}", name, e),
            }
        }
        found
    }

    /// First candidate at or above the minimum version.
    ///
    /// Fails with [`LauncherError::InterpreterNotFound`] when nothing resolves
    /// and [`LauncherError::InterpreterTooOld`] when everything found is too old.
    pub async fn find(&self) -> Result<Interpreter> {
        let mut newest_too_old: Option<Interpreter> = None;

        for path in self.resolve_candidates() {
            let version = match Self::probe(&path).await {
                Ok(version) => version,
                Err(e) => {
                    tracing::debug!("Skipping {}: {e:#}", path.display());
                    continue;
                }
            };

            if version >= self.min_version {
                tracing::info!("Using interpreter {} ({})", path.display(), version);
                return Ok(Interpreter {
                    path,
                    version,
                });
            }

            tracing::debug!("{} is {}, below {}", path.display(), version, self.min_version);
            if newest_too_old.as_ref().is_none_or(|old| version > old.version) {
                newest_too_old = Some(Interpreter {
                    path,
                    version,
                });
            }
        }

        match newest_too_old {
            Some(old) => Err(LauncherError::InterpreterTooOld {
                interpreter: old.path.display().to_string(),
                found: old.version.to_string(),
                required: self.min_version.to_string(),
            }
            .into()),
            None => Err(LauncherError::InterpreterNotFound {
                candidates: self.candidates.join(", "),
            }
            .into()),
        }
    }
}
