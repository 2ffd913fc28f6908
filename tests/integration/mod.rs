//! Integration test suite for qrprint-launcher
//!
//! End-to-end tests that run the compiled launcher against temporary install
//! directories.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **run**: the bootstrap sequence (update check, environment, dependencies, launch)
//! - **status**: the read-only status report
//! - **release**: packaging the release archive
//!
//! Scenarios that execute an interpreter use a shell-script stand-in and are
//! Unix-only.

#[path = "../common/mod.rs"]
mod common;

mod release;
mod run;
mod status;
