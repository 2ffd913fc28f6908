//! Spinners for long-running bootstrap steps
//!
//! Fetching, creating the environment and running pip can each take a while
//! with no output of their own. A spinner shows the step is alive.
//!
//! # Environment Variables
//!
//! - `QRPRINT_NO_PROGRESS`: Set to any non-empty value to disable spinners
//!
//! Spinners are also hidden when stdout is not a terminal, so piped or
//! redirected transcripts stay clean.
//!
//! # Examples
//!
//! ```rust
//! use qrprint_launcher::utils::progress::ProgressBar;
//!
//! let spinner = ProgressBar::new_spinner(false);
//! spinner.set_message("Installing dependencies...");
//! spinner.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::IsTerminal;
use std::time::Duration;

use crate::constants::ENV_NO_PROGRESS;

/// Decide whether spinners should be drawn.
///
/// `no_progress` is the `--no-progress` flag; the environment variable and
/// the terminal check are consulted only when the flag is unset.
#[must_use]
pub fn progress_enabled(no_progress: bool) -> bool {
    if no_progress {
        return false;
    }
    if std::env::var(ENV_NO_PROGRESS).is_ok_and(|v| !v.is_empty()) {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// A spinner with consistent styling.
///
/// A hidden spinner accepts every call and draws nothing.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a spinner, ticking every 100ms when `visible`.
    pub fn new_spinner(visible: bool) -> Self {
        let bar = if visible {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            IndicatifBar::hidden()
        };
        Self {
            inner: bar,
        }
    }

    /// Sets the message shown next to the spinner.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Whether the spinner is drawn at all.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    /// Stops the spinner and removes it from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
