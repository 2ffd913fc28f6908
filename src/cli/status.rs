//! `status`: report the installation state without changing anything.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::CliConfig;
use crate::config::LauncherConfig;
use crate::environment::{InterpreterFinder, PythonEnvironment};
use crate::git::{CheckoutState, GitCheckout};
use crate::utils::report::StatusReporter;

/// Show what the bootstrap would find.
#[derive(Args, Debug, Default)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let install_dir = config.resolve_install_dir()?;
        let launcher_config = config.load_launcher_config(&install_dir).await?;
        // The report is the output, so --quiet does not apply
        let reporter = StatusReporter::new(false, false);
        report_status(&install_dir, &launcher_config, &reporter).await;
        Ok(())
    }
}

/// Print one line per check. No network access and no writes.
pub async fn report_status(install_dir: &Path, config: &LauncherConfig, reporter: &StatusReporter) {
    reporter.info(format!("Install directory: {}", install_dir.display()));

    let checkout = GitCheckout::new(install_dir);
    let state = checkout.probe().await;
    match state {
        CheckoutState::Present => {
            let branch = match checkout.current_branch().await {
                Ok(Some(branch)) => branch,
                Ok(None) => "detached HEAD".to_string(),
                Err(_) => "unknown branch".to_string(),
            };
            reporter.info(format!("Checkout: {state} ({branch})"));
        }
        _ => reporter.info(format!("Checkout: {state}")),
    }

    let environment = PythonEnvironment::new(config.venv_path(install_dir));
    reporter.info(format!("Environment: {} ({})", environment.probe(), environment.dir().display()));

    let entry_point = config.entry_point_path(install_dir);
    reporter.info(format!("Entry point: {} ({})", config.entry_point.display(), presence(&entry_point)));

    let requirements = config.requirements_path(install_dir);
    if requirements.is_file() {
        reporter.info(format!("Dependencies: {} (found)", config.requirements.display()));
    } else {
        reporter.info(format!(
            "Dependencies: {} (missing, {} will be installed)",
            config.requirements.display(),
            config.fallback_dependency
        ));
    }

    let finder = InterpreterFinder::new(config.interpreters.clone(), config.min_python_version());
    match finder.find().await {
        Ok(interpreter) => reporter.info(format!(
            "Interpreter: {} ({})",
            interpreter.path.display(),
            interpreter.version
        )),
        Err(e) => reporter.info(format!("Interpreter: not found ({e})")),
    }
}

fn presence(path: &Path) -> &'static str {
    if path.is_file() { "found" } else { "missing" }
}
