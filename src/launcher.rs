//! Starting the application inside the environment

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::LauncherError;
use crate::utils::process::ProcessCommand;

/// Runs the entry point with the environment's interpreter.
pub struct AppLauncher {
    python: PathBuf,
    entry_point: PathBuf,
    working_dir: PathBuf,
}

impl AppLauncher {
    pub fn new(
        python: impl AsRef<Path>,
        entry_point: impl AsRef<Path>,
        working_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            python: python.as_ref().to_path_buf(),
            entry_point: entry_point.as_ref().to_path_buf(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    /// The application script.
    #[must_use]
    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }

    /// Fail with [`LauncherError::EntryPointMissing`] unless the script exists.
    pub fn ensure_entry_point(&self) -> Result<()> {
        if self.entry_point.is_file() {
            Ok(())
        } else {
            Err(LauncherError::EntryPointMissing {
                path: self.entry_point.display().to_string(),
            }
            .into())
        }
    }

    /// Run the application in the foreground with inherited stdio.
    ///
    /// Returns the application's exit code. A non-zero code is not an error;
    /// only failing to start the interpreter is.
    pub async fn launch(&self) -> Result<Option<i32>> {
        self.ensure_entry_point()?;

        let code = ProcessCommand::new(&self.python)
            .arg(self.entry_point.as_os_str())
            .current_dir(&self.working_dir)
            .status()
            .await
            .map_err(|e| LauncherError::LaunchFailed {
                path: self.entry_point.display().to_string(),
                reason: format!("{e:#}"),
            })?;

        tracing::info!(exit_code = ?code, "Application exited");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_entry_point_names_file() {
        let temp = TempDir::new().unwrap();
        let launcher = AppLauncher::new(
            temp.path().join(".venv/bin/python"),
            temp.path().join("gui_qr_print_service.py"),
            temp.path(),
        );

        let err = launcher.launch().await.unwrap_err();
        match err.downcast_ref::<LauncherError>() {
            Some(LauncherError::EntryPointMissing {
                path,
            }) => assert!(path.ends_with("gui_qr_print_service.py")),
            other => panic!("Expected EntryPointMissing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unstartable_interpreter_is_launch_failed() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("gui_qr_print_service.py");
        std::fs::write(&entry, "print('hi')\n").unwrap();

        let launcher = AppLauncher::new(temp.path().join("missing-python"), &entry, temp.path());
        let err = launcher.launch().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LauncherError>(),
            Some(LauncherError::LaunchFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_returns_application_exit_code() {
        use crate::test_utils::FakePython;

        let temp = TempDir::new().unwrap();
        let fake = FakePython::new(temp.path().join("calls.log")).app_exit(3);
        let python = fake.write_venv(&temp.path().join(".venv")).unwrap();
        let entry = temp.path().join("gui_qr_print_service.py");
        std::fs::write(&entry, "print('hi')\n").unwrap();

        let launcher = AppLauncher::new(&python, &entry, temp.path());
        assert_eq!(launcher.launch().await.unwrap(), Some(3));
        assert_eq!(fake.calls(), vec![entry.display().to_string()]);
    }
}
