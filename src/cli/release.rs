//! `release`: build the distributable archive.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::{CliConfig, existing_dir};
use crate::release::ReleasePackager;

/// Package the release files into a zip archive.
#[derive(Args, Debug, Default)]
pub struct ReleaseCommand {
    /// Where `release/` and the archive are written (defaults to the source directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReleaseCommand {
    /// Packages the explicit install directory, or the current directory.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let source_dir = match &config.install_dir {
            Some(dir) => existing_dir(dir)?,
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let output_dir = match self.output {
            Some(dir) => {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                dir
            }
            None => source_dir.clone(),
        };

        let launcher_config = config.load_launcher_config(&source_dir).await?;
        let reporter = config.reporter();
        ReleasePackager::new(&source_dir, &output_dir, launcher_config.release_files).package(&reporter)?;
        Ok(())
    }
}
