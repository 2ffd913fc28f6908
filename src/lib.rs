//! Self-updating launcher for the QR Print Client
//!
//! The QR Print Client is a desktop Python application distributed as a git
//! checkout. This crate is the native launcher that sits next to it and, on
//! every start:
//!
//! 1. fetches the checkout's remote and pulls pending commits
//! 2. restarts itself when the pull changed the launcher's own files
//! 3. creates the application's virtual environment on first run
//! 4. installs dependencies from `requirements.txt` (or a fallback package)
//! 5. runs `gui_qr_print_service.py` in the foreground
//!
//! # Modules
//!
//! - [`bootstrap`] - the sequence above
//! - [`update`] - update check, pull and restart
//! - [`git`] - git CLI wrapper for the install directory
//! - [`environment`] - interpreter discovery and virtual environment creation
//! - [`installer`] - pip invocations
//! - [`launcher`] - starting the application
//! - [`release`] - building the distributable archive
//! - [`config`] - optional `qrprint.toml`
//! - [`core`] - error types
//! - [`cli`] - command-line interface
//! - [`utils`] - platform helpers, subprocesses, spinners and the transcript

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod environment;
pub mod git;
pub mod installer;
pub mod launcher;
pub mod release;
pub mod update;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
