//! Isolated interpreter environment
//!
//! The application runs inside a virtual environment next to the launcher.
//! [`PythonEnvironment::ensure`] creates it on first run and leaves it alone
//! afterwards. A directory left behind by an interrupted creation is reported
//! as [`EnvironmentState::Broken`] and never deleted automatically.

pub mod interpreter;

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{VENV_CREATE_TIMEOUT, VENV_MARKER_FILE};
use crate::core::LauncherError;
use crate::utils::platform::venv_python_path;
use crate::utils::process::ProcessCommand;

pub use interpreter::{Interpreter, InterpreterFinder};

/// Result of probing the environment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentState {
    /// Directory does not exist
    Absent,
    /// Interpreter and `pyvenv.cfg` are both present
    Ready,
    /// Directory exists but something is missing
    Broken {
        /// What is missing
        reason: String,
    },
}

impl fmt::Display for EnvironmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Ready => write!(f, "ready"),
            Self::Broken {
                reason,
            } => write!(f, "broken ({reason})"),
        }
    }
}

/// What [`PythonEnvironment::ensure`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    /// The environment was already usable
    Existing,
    /// The environment was created with this interpreter
    Created(Interpreter),
}

/// Handle to the environment directory and its interpreter.
#[derive(Debug, Clone)]
pub struct PythonEnvironment {
    dir: PathBuf,
}

impl PythonEnvironment {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Environment root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Interpreter inside the environment.
    #[must_use]
    pub fn python(&self) -> PathBuf {
        venv_python_path(&self.dir)
    }

    /// Classify the directory without touching it.
    #[must_use]
    pub fn probe(&self) -> EnvironmentState {
        if !self.dir.exists() {
            return EnvironmentState::Absent;
        }
        if !self.dir.is_dir() {
            return EnvironmentState::Broken {
                reason: "path exists but is not a directory".to_string(),
            };
        }
        if !self.dir.join(VENV_MARKER_FILE).is_file() {
            return EnvironmentState::Broken {
                reason: format!("missing {VENV_MARKER_FILE}"),
            };
        }
        if !self.python().is_file() {
            return EnvironmentState::Broken {
                reason: format!("missing interpreter {}", self.python().display()),
            };
        }
        EnvironmentState::Ready
    }

    /// Make sure the environment exists, creating it with `finder` if absent.
    pub async fn ensure(&self, finder: &InterpreterFinder) -> Result<Provisioned> {
        match self.probe() {
            EnvironmentState::Ready => {
                tracing::debug!("Environment at {} is ready", self.dir.display());
                Ok(Provisioned::Existing)
            }
            EnvironmentState::Broken {
                reason,
            } => Err(LauncherError::EnvironmentBroken {
                path: self.dir.display().to_string(),
                reason,
            }
            .into()),
            EnvironmentState::Absent => {
                let interpreter = finder.find().await?;
                self.create(&interpreter).await?;
                Ok(Provisioned::Created(interpreter))
            }
        }
    }

    /// `<interpreter> -m venv <dir>`, then verify the result.
    pub async fn create(&self, interpreter: &Interpreter) -> Result<()> {
        tracing::info!(
            "Creating environment at {} with {} {}",
            self.dir.display(),
            interpreter.path.display(),
            interpreter.version
        );

        let output = ProcessCommand::new(&interpreter.path)
            .args(["-m", "venv"])
            .arg(self.dir.as_os_str())
            .with_timeout(Some(VENV_CREATE_TIMEOUT))
            .output()
            .await
            .map_err(|e| LauncherError::EnvironmentCreationFailed {
                path: self.dir.display().to_string(),
                reason: format!("{e:#}"),
            })?;

        if !output.success {
            return Err(LauncherError::EnvironmentCreationFailed {
                path: self.dir.display().to_string(),
                reason: output.stderr_tail(10),
            }
            .into());
        }

        match self.probe() {
            EnvironmentState::Ready => Ok(()),
            state => Err(LauncherError::EnvironmentCreationFailed {
                path: self.dir.display().to_string(),
                reason: format!("environment is {state} after creation"),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_probe_absent_and_broken() {
        let temp = TempDir::new().unwrap();
        let env = PythonEnvironment::new(temp.path().join(".venv"));
        assert_eq!(env.probe(), EnvironmentState::Absent);

        std::fs::create_dir(env.dir()).unwrap();
        assert!(matches!(env.probe(), EnvironmentState::Broken { reason } if reason.contains("pyvenv.cfg")));

        std::fs::write(env.dir().join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();
        assert!(matches!(env.probe(), EnvironmentState::Broken { reason } if reason.contains("interpreter")));
    }

    #[tokio::test]
    async fn test_ensure_broken_is_error_and_keeps_directory() {
        let temp = TempDir::new().unwrap();
        let env = PythonEnvironment::new(temp.path().join(".venv"));
        std::fs::create_dir(env.dir()).unwrap();

        let finder = InterpreterFinder::new(vec!["python3".to_string()], semver::Version::new(3, 8, 0));
        let err = env.ensure(&finder).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LauncherError>(),
            Some(LauncherError::EnvironmentBroken { .. })
        ));
        assert!(env.dir().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_creates_once() {
        use crate::test_utils::FakePython;

        let temp = TempDir::new().unwrap();
        let fake = FakePython::new(temp.path().join("calls.log"));
        let base = fake.write(&temp.path().join("base-python")).unwrap();
        let finder = InterpreterFinder::new(vec![base.display().to_string()], semver::Version::new(3, 8, 0));

        let env = PythonEnvironment::new(temp.path().join(".venv"));
        let first = env.ensure(&finder).await.unwrap();
        assert!(matches!(first, Provisioned::Created(_)));
        assert_eq!(env.probe(), EnvironmentState::Ready);

        let second = env.ensure(&finder).await.unwrap();
        assert_eq!(second, Provisioned::Existing);

        let venv_calls = fake.calls().iter().filter(|c| c.starts_with("-m venv")).count();
        assert_eq!(venv_calls, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_create_failure_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let failing = temp.path().join("failing-python");
        std::fs::write(&failing, "#!/bin/sh\necho 'No module named venv' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&failing, std::fs::Permissions::from_mode(0o755)).unwrap();

        let env = PythonEnvironment::new(temp.path().join(".venv"));
        let interpreter = Interpreter {
            path: failing,
            version: semver::Version::new(3, 11, 0),
        };
        let err = env.create(&interpreter).await.unwrap_err();
        match err.downcast_ref::<LauncherError>() {
            Some(LauncherError::EnvironmentCreationFailed {
                reason,
                ..
            }) => assert!(reason.contains("No module named venv")),
            other => panic!("Expected EnvironmentCreationFailed, got {other:?}"),
        }
    }
}
