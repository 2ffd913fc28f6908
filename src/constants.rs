//! Constants shared across the launcher.
//!
//! File names, timeouts and environment variable names live here so the
//! defaults in [`crate::config::LauncherConfig`] and the messages printed by the
//! bootstrap sequence stay in sync.

use std::time::Duration;

/// Human-readable name of the launched application, used in transcript lines.
pub const APP_DISPLAY_NAME: &str = "QR Print Client";

/// Name of the launcher binary. A pull touching this file triggers a restart.
pub const LAUNCHER_BIN_NAME: &str = "qrprint-launcher";

/// Optional per-installation configuration file.
pub const CONFIG_FILE_NAME: &str = "qrprint.toml";

/// Main application entry point launched inside the environment.
pub const DEFAULT_ENTRY_POINT: &str = "gui_qr_print_service.py";

/// Directory of the isolated interpreter environment, relative to the install dir.
pub const DEFAULT_VENV_DIR: &str = ".venv";

/// Dependency manifest installed with `pip install -r`.
pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

/// Dependency installed when the manifest is missing.
pub const DEFAULT_FALLBACK_DEPENDENCY: &str = "requests";

/// Remote the checkout is expected to track.
pub const DEFAULT_REMOTE: &str = "origin";

/// Oldest interpreter version the application supports.
pub const DEFAULT_MIN_PYTHON: &str = "3.8";

/// Marker file written by `python -m venv` at the environment root.
pub const VENV_MARKER_FILE: &str = "pyvenv.cfg";

/// Timeout for `git fetch` (60 seconds).
///
/// A fetch that exceeds this is treated like an unreachable remote: the update
/// check reports zero pending commits and the launch continues.
pub const GIT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for local git queries such as `rev-parse` and `rev-list` (30 seconds).
pub const GIT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for `git pull` (5 minutes).
pub const GIT_PULL_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for creating the virtual environment (5 minutes).
pub const VENV_CREATE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default timeout for a single pip invocation (10 minutes).
pub const DEFAULT_INSTALL_TIMEOUT_SECS: u64 = 600;

/// Timeout for `python --version` probes (10 seconds).
pub const INTERPRETER_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the install directory.
pub const ENV_INSTALL_DIR: &str = "QRPRINT_INSTALL_DIR";

/// Environment variable disabling spinners when set to any non-empty value.
pub const ENV_NO_PROGRESS: &str = "QRPRINT_NO_PROGRESS";

/// Name of the release staging directory created by `release`.
pub const RELEASE_DIR_NAME: &str = "release";

/// Name of the release archive created by `release`.
pub const RELEASE_ZIP_NAME: &str = "qr-print-client.zip";
