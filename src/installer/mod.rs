//! Dependency installation inside the environment
//!
//! Three pip invocations at most, run one after another:
//!
//! 1. `python -m pip install --upgrade pip`
//! 2. `python -m pip install -r requirements.txt` when the manifest exists,
//!    otherwise `python -m pip install <fallback>`
//!
//! pip output is captured and kept off the transcript. A failing step is
//! logged, shown as a warning and recorded in the [`InstallReport`], but it
//! never stops the bootstrap: an application that already has its packages
//! should still start when the package index is unreachable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::process::ProcessCommand;
use crate::utils::report::StatusReporter;

/// One pip invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStep {
    /// `pip install --upgrade pip`
    UpgradePip,
    /// `pip install -r <manifest>`
    Requirements(PathBuf),
    /// `pip install <package>`
    Fallback(String),
}

impl InstallStep {
    fn pip_args(&self) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = vec!["-m".into(), "pip".into(), "install".into()];
        match self {
            Self::UpgradePip => {
                args.push("--upgrade".into());
                args.push("pip".into());
            }
            Self::Requirements(manifest) => {
                args.push("-r".into());
                args.push(manifest.as_os_str().to_owned());
            }
            Self::Fallback(package) => args.push(package.into()),
        }
        args
    }
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpgradePip => write!(f, "pip upgrade"),
            Self::Requirements(manifest) => {
                let name = manifest.file_name().map_or_else(
                    || manifest.display().to_string(),
                    |n| n.to_string_lossy().into_owned(),
                );
                write!(f, "install from {name}")
            }
            Self::Fallback(package) => write!(f, "install of {package}"),
        }
    }
}

/// How one step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Succeeded,
    /// Non-zero exit (`code` is `None` when killed by a signal)
    Failed {
        code: Option<i32>,
    },
    /// pip could not be run at all, or timed out
    Error {
        message: String,
    },
}

/// Outcome of every step that ran.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub steps: Vec<(InstallStep, StepResult)>,
}

impl InstallReport {
    /// True when every step succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|(_, result)| *result == StepResult::Succeeded)
    }

    /// Steps that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &(InstallStep, StepResult)> {
        self.steps.iter().filter(|(_, result)| *result != StepResult::Succeeded)
    }
}

/// Installs dependencies with the environment's interpreter.
pub struct DependencyInstaller {
    python: PathBuf,
    requirements: PathBuf,
    fallback: String,
    working_dir: PathBuf,
    timeout: Duration,
}

impl DependencyInstaller {
    /// `python` is the environment interpreter; pip runs in `working_dir`.
    pub fn new(
        python: impl AsRef<Path>,
        requirements: impl AsRef<Path>,
        fallback: impl Into<String>,
        working_dir: impl AsRef<Path>,
        timeout: Duration,
    ) -> Self {
        Self {
            python: python.as_ref().to_path_buf(),
            requirements: requirements.as_ref().to_path_buf(),
            fallback: fallback.into(),
            working_dir: working_dir.as_ref().to_path_buf(),
            timeout,
        }
    }

    /// Steps to run, decided by whether the manifest exists right now.
    #[must_use]
    pub fn plan(&self) -> Vec<InstallStep> {
        let install = if self.requirements.is_file() {
            InstallStep::Requirements(self.requirements.clone())
        } else {
            tracing::info!(
                "No {} found, installing {} instead",
                self.requirements.display(),
                self.fallback
            );
            InstallStep::Fallback(self.fallback.clone())
        };
        vec![InstallStep::UpgradePip, install]
    }

    async fn run_step(&self, step: &InstallStep) -> StepResult {
        let command = ProcessCommand::new(&self.python)
            .args(step.pip_args())
            .current_dir(&self.working_dir)
            .with_timeout(Some(self.timeout));

        match command.output().await {
            Ok(output) if output.success => StepResult::Succeeded,
            Ok(output) => {
                let tail = output.stderr_tail(5);
                if !tail.is_empty() {
                    tracing::debug!("pip stderr ({step}):\n{tail}");
                }
                StepResult::Failed {
                    code: output.code,
                }
            }
            Err(e) => StepResult::Error {
                message: format!("{e:#}"),
            },
        }
    }

    /// Run every planned step, reporting failures as warnings.
    pub async fn install(&self, reporter: &StatusReporter) -> InstallReport {
        reporter.info("Installing dependencies...");
        let mut report = InstallReport::default();

        for step in self.plan() {
            let spinner = reporter.spinner(format!("Running {step}..."));
            let result = self.run_step(&step).await;
            spinner.finish_and_clear();

            match &result {
                StepResult::Succeeded => tracing::debug!("{step} succeeded"),
                StepResult::Failed {
                    code,
                } => {
                    let code_text = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                    tracing::warn!(step = %step, exit_code = ?code, "Dependency step failed");
                    reporter.warn(format!("⚠ Warning: {step} failed (exit code {code_text})"));
                }
                StepResult::Error {
                    message,
                } => {
                    tracing::warn!(step = %step, error = %message, "Dependency step could not run");
                    reporter.warn(format!("⚠ Warning: {step} could not run: {message}"));
                }
            }
            report.steps.push((step, result));
        }

        if report.all_succeeded() {
            reporter.success("Dependencies installed");
        } else {
            reporter.warn("⚠ Some dependencies may be missing, continuing anyway");
        }
        report
    }
}
