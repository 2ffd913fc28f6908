//! `run`: the full bootstrap, also used when no subcommand is given.

use anyhow::Result;
use clap::Args;

use super::CliConfig;
use crate::bootstrap::{Bootstrap, BootstrapOutcome};
use crate::update::ProcessRestarter;

/// Update, provision and launch.
#[derive(Args, Debug, Default)]
pub struct RunCommand {}

impl RunCommand {
    /// Succeeds whatever the application's own exit code was.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let install_dir = config.resolve_install_dir()?;
        let launcher_config = config.load_launcher_config(&install_dir).await?;
        let reporter = config.reporter();
        let restarter = ProcessRestarter::from_current_process()?;

        let outcome = Bootstrap::new(&install_dir, launcher_config, &reporter, &restarter).run().await?;
        match outcome {
            BootstrapOutcome::Completed {
                app_exit,
            } => tracing::debug!("Bootstrap completed, application exit code {:?}", app_exit),
            BootstrapOutcome::Restarted => tracing::debug!("Handed over to the restarted launcher"),
        }
        Ok(())
    }
}
