//! Error handling for the launcher
//!
//! Two layers, same as everywhere else in the crate:
//! 1. [`LauncherError`] - strongly-typed failures raised by the bootstrap steps
//! 2. [`ErrorContext`] - a wrapper adding a suggestion and details for the operator
//!
//! Steps return `anyhow::Result` and attach context with `.context(...)`.
//! `main` hands the final error to [`user_friendly_error`], prints the
//! resulting [`ErrorContext`] and exits with status 1.
//!
//! # Error Categories
//!
//! - **Environment**: [`LauncherError::InterpreterNotFound`],
//!   [`LauncherError::InterpreterTooOld`], [`LauncherError::EnvironmentCreationFailed`],
//!   [`LauncherError::EnvironmentBroken`]
//! - **Updates**: [`LauncherError::UpdateApplyFailed`], [`LauncherError::RestartFailed`]
//! - **Launch**: [`LauncherError::EntryPointMissing`], [`LauncherError::LaunchFailed`]
//! - **Git**: [`LauncherError::GitNotFound`], [`LauncherError::GitCommandError`]
//! - **Configuration and packaging**: [`LauncherError::ConfigError`],
//!   [`LauncherError::NothingToPackage`]
//!
//! Update-check failures never show up here: the checker recovers from them
//! and reports zero pending commits.
//!
//! # Examples
//!
//! ```rust,no_run
//! use qrprint_launcher::core::{LauncherError, user_friendly_error};
//!
//! let error = LauncherError::EntryPointMissing {
//!     path: "gui_qr_print_service.py".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for launcher operations.
#[derive(Error, Debug, Clone)]
pub enum LauncherError {
    /// A git command returned a non-zero exit code or timed out.
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g., "fetch", "pull")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// The `git` executable could not be found.
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Pulling upstream changes failed.
    ///
    /// Continuing with a partially synchronized tree is unsafe, so this is fatal.
    #[error("Failed to pull updates for branch '{branch}'")]
    UpdateApplyFailed {
        /// Branch that was being pulled
        branch: String,
        /// Error output from git
        reason: String,
    },

    /// The launcher changed during an update but could not be restarted.
    #[error("Failed to restart the launcher: {reason}")]
    RestartFailed {
        /// Why spawning the new process failed
        reason: String,
    },

    /// No usable interpreter was found on the search path.
    #[error("Python was not found (tried: {candidates})")]
    InterpreterNotFound {
        /// Comma-separated list of the candidates that were tried
        candidates: String,
    },

    /// Interpreters were found but all of them are older than required.
    #[error("Python {found} at {interpreter} is too old, {required} or newer is required")]
    InterpreterTooOld {
        /// Path of the newest interpreter found
        interpreter: String,
        /// Its version
        found: String,
        /// Minimum supported version
        required: String,
    },

    /// `python -m venv` failed.
    #[error("Failed to create virtual environment at {path}")]
    EnvironmentCreationFailed {
        /// Environment directory
        path: String,
        /// Error output from the interpreter
        reason: String,
    },

    /// The environment directory exists but is unusable.
    #[error("Virtual environment at {path} is incomplete: {reason}")]
    EnvironmentBroken {
        /// Environment directory
        path: String,
        /// What is missing
        reason: String,
    },

    /// The application entry point does not exist.
    #[error("Entry point not found: {path}")]
    EntryPointMissing {
        /// Path of the missing file
        path: String,
    },

    /// The application could not be started at all.
    #[error("Failed to start {path}: {reason}")]
    LaunchFailed {
        /// Entry point that was being launched
        path: String,
        /// Spawn error
        reason: String,
    },

    /// Configuration file problems.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// None of the release files exist.
    #[error("No release files found in {dir}")]
    NothingToPackage {
        /// Directory that was searched
        dir: String,
    },

    /// File system operation failed.
    #[error("File system error: {operation} on {path}")]
    FileSystemError {
        /// The operation that failed
        operation: String,
        /// The path involved
        path: String,
    },

    /// Permission denied for an operation.
    #[error("Permission denied: {operation} on {path}")]
    PermissionDenied {
        /// The operation that was denied
        operation: String,
        /// The path involved
        path: String,
    },

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error context wrapper that adds operator-facing guidance to a [`LauncherError`].
///
/// Displayed in the terminal as:
/// - error in red and bold
/// - details in yellow
/// - suggestion in green
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying launcher error
    pub error: LauncherError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: LauncherError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining why the error occurred.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with actionable suggestions.
///
/// Recognises [`LauncherError`] anywhere in the error chain, then
/// [`std::io::Error`] kinds, and falls back to a generic context carrying the
/// full chain of causes.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    // Errors wrapped with `.context(...)` still carry the typed cause
    if let Some(launcher_error) = error.chain().find_map(|e| e.downcast_ref::<LauncherError>()) {
        return create_error_context(launcher_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(LauncherError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the install directory is writable by your user")
                .with_details("The launcher writes the virtual environment and pulls updates into its own directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(LauncherError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(
                    "This error occurs when a required file or directory cannot be found",
                );
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(LauncherError::Other {
        message,
    })
}

/// Map each [`LauncherError`] variant to a context with tailored guidance.
fn create_error_context(error: LauncherError) -> ErrorContext {
    match &error {
        LauncherError::GitNotFound => ErrorContext::new(error.clone())
            .with_suggestion("Install git from https://git-scm.com/ or your package manager (e.g., 'brew install git', 'apt install git')")
            .with_details("Git is only needed for automatic updates; installs without a .git directory skip the update check"),

        LauncherError::GitCommandError { operation, .. } => ErrorContext::new(error.clone())
            .with_suggestion(match operation.as_str() {
                op if op.contains("fetch") || op.contains("pull") => {
                    "Check your internet connection and access to the remote. Try 'git pull' manually in the install directory"
                }
                _ => "Check the state of the checkout with 'git status' in the install directory",
            })
            .with_details("Git operations fail on network problems, authentication prompts, or local modifications"),

        LauncherError::UpdateApplyFailed { branch, reason } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Resolve the problem in the install directory (e.g. 'git status', 'git stash') and run 'git pull origin {branch}' manually"
            ))
            .with_details(if reason.trim().is_empty() {
                "The pull did not complete; the launcher stops rather than run a partially updated tree".to_string()
            } else {
                reason.trim().to_string()
            }),

        LauncherError::RestartFailed { .. } => ErrorContext::new(error.clone())
            .with_suggestion("The update was applied. Start the launcher again manually to use the new version")
            .with_details("The launcher's own files changed during the update, so it tried to re-launch itself"),

        LauncherError::InterpreterNotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion(match cfg!(windows) {
                true => "Install Python 3 from https://www.python.org/downloads/ and tick 'Add python.exe to PATH'",
                false => "Install Python 3 with your package manager (e.g., 'apt install python3 python3-venv', 'brew install python')",
            })
            .with_details("An interpreter is needed once, to create the isolated environment for the application"),

        LauncherError::InterpreterTooOld { required, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Install Python {required} or newer and make sure it comes first on PATH"))
            .with_details("Set 'interpreters' in qrprint.toml to point at a specific interpreter"),

        LauncherError::EnvironmentCreationFailed { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion(match cfg!(windows) {
                true => "Reinstall Python with the 'pip' and 'venv' components selected",
                false => "Install the venv module (e.g., 'apt install python3-venv') and try again",
            })
            .with_details(reason.trim().to_string()),

        LauncherError::EnvironmentBroken { path, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Delete '{path}' and run the launcher again to recreate it"))
            .with_details("The environment directory exists but a previous creation did not complete"),

        LauncherError::EntryPointMissing { path } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Make sure '{path}' is present in the install directory, or set 'entry_point' in qrprint.toml"))
            .with_details("The launcher only starts the application; it does not download it"),

        LauncherError::LaunchFailed { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Delete the virtual environment directory and run the launcher again")
            .with_details("The environment's interpreter could not be executed"),

        LauncherError::ConfigError { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the TOML syntax in qrprint.toml. Verify quotes, brackets, and value types")
            .with_details("All keys in qrprint.toml are optional; delete the file to use the defaults"),

        LauncherError::NothingToPackage { dir } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Run 'release' from the project directory or check 'release_files' in qrprint.toml (searched {dir})")),

        LauncherError::PermissionDenied { operation, path } => ErrorContext::new(error.clone())
            .with_suggestion(match cfg!(windows) {
                true => "Run as Administrator or check file permissions in File Explorer",
                false => "Check file permissions with 'ls -la'",
            })
            .with_details(format!("Cannot {operation} due to insufficient permissions on {path}")),

        _ => ErrorContext::new(error.clone()),
    }
}
