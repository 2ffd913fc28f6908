//! Operator-facing transcript of the bootstrap sequence
//!
//! The launcher talks to the operator in short sequential lines on stdout:
//! plain for progress, green for success, yellow for warnings. Every line is
//! also kept in memory so callers can inspect what was reported.

use colored::Colorize;
use std::sync::Mutex;

use crate::utils::progress::ProgressBar;

/// Prints and records status lines.
pub struct StatusReporter {
    quiet: bool,
    show_progress: bool,
    lines: Mutex<Vec<String>>,
}

impl StatusReporter {
    /// `quiet` suppresses informational and success lines; warnings are always
    /// printed. `show_progress` enables spinners.
    #[must_use]
    pub fn new(quiet: bool, show_progress: bool) -> Self {
        Self {
            quiet,
            show_progress,
            lines: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }

    /// Plain progress line.
    pub fn info(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        self.record(line);
        if !self.quiet {
            println!("{line}");
        }
    }

    /// Green success line.
    pub fn success(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        self.record(line);
        if !self.quiet {
            println!("{}", line.green());
        }
    }

    /// Yellow warning line, printed even when quiet.
    pub fn warn(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        self.record(line);
        println!("{}", line.yellow());
    }

    /// Start a spinner for a long step. Hidden when progress is disabled or quiet.
    #[must_use]
    pub fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        let spinner = ProgressBar::new_spinner(self.show_progress && !self.quiet);
        spinner.set_message(message);
        spinner
    }

    /// Every line reported so far, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    /// Whether any reported line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}
