//! Cross-platform utilities
//!
//! # Modules
//!
//! - [`platform`] - executable names and interpreter layout per platform
//! - [`process`] - subprocess builder for interpreter and pip invocations
//! - [`progress`] - spinners for long-running steps
//! - [`report`] - the stdout transcript of the bootstrap sequence

pub mod platform;
pub mod process;
pub mod progress;
pub mod report;

pub use platform::{get_git_command, is_windows, venv_python_path};
pub use process::{ProcessCommand, ProcessOutput};
pub use progress::{ProgressBar, progress_enabled};
pub use report::StatusReporter;
