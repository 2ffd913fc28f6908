//! Command-line interface
//!
//! Running the launcher with no arguments performs the full bootstrap, which
//! is what the desktop shortcut does. Two auxiliary subcommands exist for
//! maintainers:
//!
//! - `status` - report what the bootstrap would find, without changing anything
//! - `release` - build the distributable archive
//!
//! # Global Options
//!
//! - `--install-dir <DIR>` (env `QRPRINT_INSTALL_DIR`): installation to operate on;
//!   defaults to the directory containing the launcher executable
//! - `--config <FILE>`: configuration file instead of `<install-dir>/qrprint.toml`
//! - `-v, --verbose`: debug logging on stderr
//! - `-q, --quiet`: only warnings and errors
//! - `--no-progress`: no spinners (also `QRPRINT_NO_PROGRESS`)
//!
//! `RUST_LOG` overrides the log level chosen by `--verbose`/`--quiet`.

mod release;
mod run;
mod status;


use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::utils::platform::executable_dir;
use crate::utils::progress::progress_enabled;
use crate::utils::report::StatusReporter;

/// Settings derived from the global flags, shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Suppress informational transcript lines
    pub quiet: bool,

    /// Disable spinners
    pub no_progress: bool,

    /// Explicit configuration file
    pub config_path: Option<PathBuf>,

    /// Explicit install directory
    pub install_dir: Option<PathBuf>,
}

impl CliConfig {
    /// The install directory: the explicit one, or the executable's directory.
    pub fn resolve_install_dir(&self) -> Result<PathBuf> {
        match &self.install_dir {
            Some(dir) => existing_dir(dir),
            None => executable_dir(),
        }
    }

    /// Configuration for `install_dir`, honoring `--config`.
    pub async fn load_launcher_config(&self, install_dir: &Path) -> Result<LauncherConfig> {
        LauncherConfig::load_with_optional(install_dir, self.config_path.as_deref()).await
    }

    /// Transcript printer honoring `--quiet` and `--no-progress`.
    #[must_use]
    pub fn reporter(&self) -> StatusReporter {
        StatusReporter::new(self.quiet, progress_enabled(self.no_progress))
    }
}

fn existing_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(LauncherError::FileSystemError {
            operation: "open install directory".to_string(),
            path: dir.display().to_string(),
        }
        .into());
    }
    std::path::absolute(dir).with_context(|| format!("Failed to resolve {}", dir.display()))
}

/// Self-updating launcher for the QR Print Client.
#[derive(Parser)]
#[command(
    name = "qrprint-launcher",
    about = "Self-updating launcher for the QR Print Client",
    version,
    long_about = "Updates the installation from git, prepares its Python environment and dependencies, \
                  then starts the QR Print Client."
)]
pub struct Cli {
    /// Command to execute (defaults to `run`)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to an alternate configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Installation directory (defaults to the launcher's own directory)
    #[arg(long, global = true, env = "QRPRINT_INSTALL_DIR")]
    install_dir: Option<PathBuf>,

    /// Disable spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Update, prepare the environment and start the application
    Run(run::RunCommand),

    /// Show the state of the installation without changing it
    Status(status::StatusCommand),

    /// Package the release archive
    Release(release::ReleaseCommand),
}

impl Cli {
    /// Execute the selected command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            quiet: self.quiet,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
            install_dir: self.install_dir.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            None => run::RunCommand::default().execute(&config).await,
            Some(Commands::Run(cmd)) => cmd.execute(&config).await,
            Some(Commands::Status(cmd)) => cmd.execute(&config).await,
            Some(Commands::Release(cmd)) => cmd.execute(&config).await,
        }
    }
}
