//! Launcher configuration
//!
//! An installation may carry a `qrprint.toml` next to the launcher. Every key
//! is optional; missing keys fall back to the defaults below, so a missing or
//! empty file behaves exactly like the stock installation.
//!
//! ```toml
//! entry_point = "gui_qr_print_service.py"
//! venv_dir = ".venv"
//! requirements = "requirements.txt"
//! fallback_dependency = "requests"
//! remote = "origin"
//! self_files = ["qrprint-launcher", "qrprint-launcher.exe", "qrprint.toml", "install.sh", "install.bat"]
//! interpreters = ["python3", "python"]
//! min_python = "3.8"
//! fetch_timeout_secs = 60
//! install_timeout_secs = 600
//! release_files = ["gui_qr_print_service.py", "install.bat", "install.sh", "README.md", "requirements.txt", "qrprint.toml"]
//! ```
//!
//! Relative paths are resolved against the install directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_ENTRY_POINT, DEFAULT_FALLBACK_DEPENDENCY, DEFAULT_INSTALL_TIMEOUT_SECS,
    DEFAULT_MIN_PYTHON, DEFAULT_REMOTE, DEFAULT_REQUIREMENTS, DEFAULT_VENV_DIR, GIT_FETCH_TIMEOUT,
    LAUNCHER_BIN_NAME,
};
use crate::core::LauncherError;
use crate::environment::interpreter::parse_lenient_version;
use crate::utils::platform::default_interpreters;

/// Resolved launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Application entry point, relative to the install directory
    pub entry_point: PathBuf,

    /// Virtual environment directory
    pub venv_dir: PathBuf,

    /// Dependency manifest passed to `pip install -r`
    pub requirements: PathBuf,

    /// Package installed when the manifest is missing
    pub fallback_dependency: String,

    /// Remote fetched and pulled from
    pub remote: String,

    /// File names whose change in a pull makes the launcher restart itself
    pub self_files: Vec<String>,

    /// Interpreter names searched on `PATH`, in order
    pub interpreters: Vec<String>,

    /// Minimum interpreter version, e.g. `"3.8"`
    pub min_python: String,

    /// Timeout for `git fetch`
    pub fetch_timeout_secs: u64,

    /// Timeout for each pip invocation
    pub install_timeout_secs: u64,

    /// Files copied into the release archive
    pub release_files: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            entry_point: PathBuf::from(DEFAULT_ENTRY_POINT),
            venv_dir: PathBuf::from(DEFAULT_VENV_DIR),
            requirements: PathBuf::from(DEFAULT_REQUIREMENTS),
            fallback_dependency: DEFAULT_FALLBACK_DEPENDENCY.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            self_files: vec![
                LAUNCHER_BIN_NAME.to_string(),
                format!("{LAUNCHER_BIN_NAME}.exe"),
                CONFIG_FILE_NAME.to_string(),
                "install.sh".to_string(),
                "install.bat".to_string(),
            ],
            interpreters: default_interpreters(),
            min_python: DEFAULT_MIN_PYTHON.to_string(),
            fetch_timeout_secs: GIT_FETCH_TIMEOUT.as_secs(),
            install_timeout_secs: DEFAULT_INSTALL_TIMEOUT_SECS,
            release_files: vec![
                DEFAULT_ENTRY_POINT.to_string(),
                "install.bat".to_string(),
                "install.sh".to_string(),
                "README.md".to_string(),
                DEFAULT_REQUIREMENTS.to_string(),
                CONFIG_FILE_NAME.to_string(),
            ],
        }
    }
}

impl LauncherConfig {
    /// Load `qrprint.toml` from the install directory, or the defaults if absent.
    pub async fn load(install_dir: &Path) -> Result<Self> {
        Self::load_with_optional(install_dir, None).await
    }

    /// Load configuration, preferring an explicit path.
    ///
    /// An explicit path must exist. Without one, `<install_dir>/qrprint.toml` is
    /// used when present and the defaults otherwise.
    pub async fn load_with_optional(install_dir: &Path, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(LauncherError::ConfigError {
                        message: format!("Config file not found: {}", path.display()),
                    }
                    .into());
                }
                Self::load_from(path).await
            }
            None => {
                let path = install_dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::load_from(&path).await
                } else {
                    tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, install_dir.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| LauncherError::ConfigError {
            message: format!("{}: {}", path.display(), e.to_string().trim()),
        })?;
        config.validate()?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the bootstrap sequence cannot work with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> anyhow::Error {
            LauncherError::ConfigError {
                message,
            }
            .into()
        };

        if self.entry_point.as_os_str().is_empty() {
            return Err(invalid("entry_point must not be empty".to_string()));
        }
        if self.venv_dir.as_os_str().is_empty() {
            return Err(invalid("venv_dir must not be empty".to_string()));
        }
        if self.remote.trim().is_empty() {
            return Err(invalid("remote must not be empty".to_string()));
        }
        if self.interpreters.is_empty() {
            return Err(invalid("interpreters must list at least one name".to_string()));
        }
        if self.fetch_timeout_secs == 0 || self.install_timeout_secs == 0 {
            return Err(invalid("timeouts must be greater than zero".to_string()));
        }
        if parse_lenient_version(&self.min_python).is_none() {
            return Err(invalid(format!("min_python '{}' is not a version", self.min_python)));
        }
        Ok(())
    }

    /// Minimum interpreter version as a comparable semver value.
    #[must_use]
    pub fn min_python_version(&self) -> semver::Version {
        parse_lenient_version(&self.min_python).unwrap_or_else(|| semver::Version::new(3, 8, 0))
    }

    /// Timeout for `git fetch`.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Timeout for each pip invocation.
    #[must_use]
    pub const fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    /// Entry point resolved against the install directory.
    #[must_use]
    pub fn entry_point_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.entry_point)
    }

    /// Environment directory resolved against the install directory.
    #[must_use]
    pub fn venv_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.venv_dir)
    }

    /// Dependency manifest resolved against the install directory.
    #[must_use]
    pub fn requirements_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.requirements)
    }
}
