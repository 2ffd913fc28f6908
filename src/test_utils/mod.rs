//! Test utilities shared by unit and integration tests
//!
//! Available to the crate's own tests and, through the `test-utils` feature,
//! to the integration test suite.

pub mod git_helper;
pub mod python_stub;

pub use git_helper::{TestGit, UpstreamFixture};
pub use python_stub::FakePython;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize tracing for tests once per process.
///
/// Uses `level` if given, otherwise `RUST_LOG`; with neither, logging stays off.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
