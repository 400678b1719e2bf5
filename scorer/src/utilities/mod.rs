//! # Utilities
//!
//! Helpers shared across scorers:
//! - [`command`]: running external tools (test runners, style checkers, coverage reporters).
//! - [`file_loader`]: reading submission files with existence and size checks.

pub mod command;
pub mod file_loader;
