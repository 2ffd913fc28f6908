//! The bootstrap sequence
//!
//! ```text
//! update check -> apply (maybe restart) -> environment -> entry point -> dependencies -> launch
//! ```
//!
//! Steps run strictly one after another. Update problems short of a failed
//! pull never stop the sequence; dependency problems are warnings; everything
//! else ends it with an error.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::LauncherConfig;
use crate::constants::{APP_DISPLAY_NAME, LAUNCHER_BIN_NAME};
use crate::environment::{InterpreterFinder, PythonEnvironment, Provisioned};
use crate::git::CheckoutState;
use crate::installer::DependencyInstaller;
use crate::launcher::AppLauncher;
use crate::update::{ApplyOutcome, Restarter, UpdateApplier, UpdateCheck, UpdateChecker};
use crate::utils::report::StatusReporter;

/// How the bootstrap ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The application ran and exited with this code
    Completed {
        app_exit: Option<i32>,
    },
    /// A new launcher process took over
    Restarted,
}

/// Runs the full sequence for one install directory.
pub struct Bootstrap<'a> {
    install_dir: PathBuf,
    config: LauncherConfig,
    reporter: &'a StatusReporter,
    restarter: &'a dyn Restarter,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        install_dir: impl AsRef<Path>,
        config: LauncherConfig,
        reporter: &'a StatusReporter,
        restarter: &'a dyn Restarter,
    ) -> Self {
        Self {
            install_dir: install_dir.as_ref().to_path_buf(),
            config,
            reporter,
            restarter,
        }
    }

    pub async fn run(&self) -> Result<BootstrapOutcome> {
        tracing::info!("Bootstrapping {} in {}", APP_DISPLAY_NAME, self.install_dir.display());
        self.reporter.info(format!("Starting {APP_DISPLAY_NAME}..."));

        if self.update().await? {
            self.reporter.info("Launcher updated, restarting...");
            self.restarter.restart()?;
            return Ok(BootstrapOutcome::Restarted);
        }

        let environment = self.provision().await?;

        let launcher = AppLauncher::new(
            environment.python(),
            self.config.entry_point_path(&self.install_dir),
            &self.install_dir,
        );
        launcher.ensure_entry_point()?;

        DependencyInstaller::new(
            environment.python(),
            self.config.requirements_path(&self.install_dir),
            &self.config.fallback_dependency,
            &self.install_dir,
            self.config.install_timeout(),
        )
        .install(self.reporter)
        .await;

        self.reporter.info(format!("Launching {APP_DISPLAY_NAME}..."));
        let app_exit = launcher.launch().await?;

        self.reporter.info(format!("{APP_DISPLAY_NAME} has closed."));
        self.reporter.info(format!("Run {LAUNCHER_BIN_NAME} again to start it."));
        Ok(BootstrapOutcome::Completed {
            app_exit,
        })
    }

    /// Check and apply updates. Returns `true` when a restart is needed.
    async fn update(&self) -> Result<bool> {
        self.reporter.info("Checking for updates...");

        let checker = UpdateChecker::new(&self.install_dir, &self.config.remote, self.config.fetch_timeout());
        let spinner = self.reporter.spinner("Fetching updates...");
        let check = checker.check().await;
        spinner.finish_and_clear();

        let status = match check {
            UpdateCheck::Skipped(CheckoutState::Invalid) => {
                self.reporter.warn("⚠ Warning: .git found but git cannot use it, skipping update check");
                return Ok(false);
            }
            UpdateCheck::Skipped(_) => {
                self.reporter.info("Not a git repository, skipping update check");
                return Ok(false);
            }
            UpdateCheck::Checked(status) if status.behind == 0 => {
                self.reporter.info("Already up to date");
                return Ok(false);
            }
            UpdateCheck::Checked(status) => status,
        };

        self.reporter.info(format!("Found {} update(s), pulling...", status.behind));
        let applier =
            UpdateApplier::new(&self.install_dir, &self.config.remote, self.config.self_files.clone());
        match applier.apply(&status).await? {
            ApplyOutcome::UpToDate => Ok(false),
            ApplyOutcome::Updated {
                changed,
            } => {
                self.reporter.success(format!("✓ Updated ({} file(s) changed)", changed.len()));
                Ok(false)
            }
            ApplyOutcome::RestartRequired {
                ..
            } => Ok(true),
        }
    }

    async fn provision(&self) -> Result<PythonEnvironment> {
        let environment = PythonEnvironment::new(self.config.venv_path(&self.install_dir));
        let finder = InterpreterFinder::new(self.config.interpreters.clone(), self.config.min_python_version());

        let spinner = self.reporter.spinner("Preparing virtual environment...");
        let provisioned = environment.ensure(&finder).await;
        spinner.finish_and_clear();

        match provisioned? {
            Provisioned::Existing => self.reporter.info("Virtual environment already exists"),
            Provisioned::Created(interpreter) => self.reporter.success(format!(
                "✓ Virtual environment created with Python {}",
                interpreter.version
            )),
        }
        Ok(environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LauncherError;
    use crate::test_utils::UpstreamFixture;
    use std::cell::Cell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRestarter {
        calls: Cell<u32>,
    }

    impl Restarter for RecordingRestarter {
        fn restart(&self) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_entry_point_stops_before_install() {
        let temp = TempDir::new().unwrap();
        let config = LauncherConfig::default();
        // Ready environment without a usable interpreter; nothing may run it
        let venv = config.venv_path(temp.path());
        std::fs::create_dir_all(crate::utils::venv_python_path(&venv).parent().unwrap()).unwrap();
        std::fs::write(crate::utils::venv_python_path(&venv), "").unwrap();
        std::fs::write(venv.join("pyvenv.cfg"), "").unwrap();

        let reporter = StatusReporter::new(true, false);
        let restarter = RecordingRestarter::default();
        let err = Bootstrap::new(temp.path(), config, &reporter, &restarter).run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LauncherError>(),
            Some(LauncherError::EntryPointMissing { path }) if path.ends_with("gui_qr_print_service.py")
        ));
        assert!(reporter.contains("Not a git repository, skipping update check"));
        assert!(reporter.contains("Virtual environment already exists"));
        assert!(!reporter.contains("Installing dependencies"));
        assert_eq!(restarter.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_self_change_restarts_without_provisioning() {
        let temp = TempDir::new().unwrap();
        let fixture = UpstreamFixture::create(temp.path(), &[("app.py", "v1")]).unwrap();
        fixture.publish("qrprint-launcher", "new launcher", "Release launcher").unwrap();

        let reporter = StatusReporter::new(true, false);
        let restarter = RecordingRestarter::default();
        let outcome = Bootstrap::new(fixture.install.repo_path(), LauncherConfig::default(), &reporter, &restarter)
            .run()
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::Restarted);
        assert_eq!(restarter.calls.get(), 1);
        assert!(reporter.contains("Launcher updated, restarting..."));
        assert!(!fixture.install.repo_path().join(".venv").exists());
        assert!(fixture.install.repo_path().join("qrprint-launcher").exists());
    }

    #[tokio::test]
    async fn test_invalid_checkout_warns_and_continues() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();

        let reporter = StatusReporter::new(true, false);
        let restarter = RecordingRestarter::default();
        let config = LauncherConfig {
            interpreters: vec!["qrprint-no-such-python".to_string()],
            ..LauncherConfig::default()
        };
        let err = Bootstrap::new(temp.path(), config, &reporter, &restarter).run().await.unwrap_err();

        assert!(reporter.contains("skipping update check"));
        assert!(matches!(
            err.downcast_ref::<LauncherError>(),
            Some(LauncherError::InterpreterNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_full_sequence_with_upstream_change() {
        use crate::test_utils::FakePython;

        let temp = TempDir::new().unwrap();
        let fixture = UpstreamFixture::create(
            temp.path(),
            &[("gui_qr_print_service.py", "print('v1')"), (".gitignore", ".venv/\n")],
        )
        .unwrap();
        fixture.publish("gui_qr_print_service.py", "print('v2')", "Update app").unwrap();

        let install_dir = fixture.install.repo_path();
        let fake = FakePython::new(temp.path().join("calls.log")).app_exit(5);
        fake.write_venv(&install_dir.join(".venv")).unwrap();

        let reporter = StatusReporter::new(true, false);
        let restarter = RecordingRestarter::default();
        let outcome = Bootstrap::new(install_dir, LauncherConfig::default(), &reporter, &restarter)
            .run()
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BootstrapOutcome::Completed {
                app_exit: Some(5)
            }
        );
        assert_eq!(restarter.calls.get(), 0);
        assert!(reporter.contains("Found 1 update(s), pulling..."));
        assert!(reporter.contains("Dependencies installed"));
        assert!(reporter.contains("QR Print Client has closed."));
        assert_eq!(
            std::fs::read_to_string(install_dir.join("gui_qr_print_service.py")).unwrap(),
            "print('v2')"
        );

        let calls = fake.calls();
        assert_eq!(calls[..2], ["-m pip install --upgrade pip", "-m pip install requests"]);
        assert!(calls[2].ends_with("gui_qr_print_service.py"));
    }
}
