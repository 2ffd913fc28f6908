//! Core types for the launcher
//!
//! Holds the error taxonomy shared by every bootstrap step:
//! - [`LauncherError`] - strongly-typed failures
//! - [`ErrorContext`] - the operator-facing wrapper with suggestions and details
//! - [`user_friendly_error`] - converts any `anyhow::Error` into an [`ErrorContext`]
//!
//! # Examples
//!
//! ```rust
//! use qrprint_launcher::core::{LauncherError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn find_entry_point() -> Result<()> {
//!     Err(LauncherError::EntryPointMissing {
//!         path: "gui_qr_print_service.py".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = find_entry_point() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, LauncherError, user_friendly_error};
