//! Scorer Error Types
//!
//! Grading distinguishes two tiers of trouble:
//!
//! - A [`ScorerFailure`](crate::result::ScorerFailure): the check could not reach a verdict
//!   because of the submission (malformed data, missing files). The runner absorbs it and the
//!   scorer reports the failure's score.
//! - A [`GradingError`]: the grading logic or its configuration is broken. It propagates
//!   through the runner and the pipeline and fails the whole grading pass.
//!
//! [`ScorerError`] is what a scorer's `evaluate` returns on its error path and carries either
//! tier. `?` converts both into it.
//!
//! # Example
//!
//! ```rust
//! use scorer::error::{GradingError, ScorerError};
//! use scorer::result::ScorerFailure;
//!
//! fn check(data: &str) -> Result<(), ScorerError> {
//!     if data.is_empty() {
//!         return Err(ScorerFailure::new("No input data was supplied.").into());
//!     }
//!     if data.len() > 1024 {
//!         return Err(GradingError::InvalidConfig("input limit exceeded".into()).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(check(""), Err(ScorerError::Failure(_))));
//! ```

use crate::result::ScorerFailure;
use std::fmt;

/// Defects and configuration errors. Never absorbed by the runner.
#[derive(Debug)]
pub enum GradingError {
    /// I/O on grader-owned resources failed (artifact output, working directories).
    Io(String),
    /// A scorer or pipeline was constructed with an impossible configuration.
    InvalidConfig(String),
    /// A scorer weight was zero, negative or not finite.
    InvalidWeight(String),
    /// A pipeline was run without any scorers.
    EmptyPipeline,
    /// Internal invariant broken inside the grading logic.
    Internal(String),
}

impl fmt::Display for GradingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingError::Io(msg) => write!(f, "I/O error: {msg}"),
            GradingError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            GradingError::InvalidWeight(msg) => write!(f, "invalid weight: {msg}"),
            GradingError::EmptyPipeline => f.write_str("pipeline has no scorers"),
            GradingError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for GradingError {}

impl From<std::io::Error> for GradingError {
    fn from(e: std::io::Error) -> Self {
        GradingError::Io(e.to_string())
    }
}

/// The error path of a scorer evaluation.
#[derive(Debug)]
pub enum ScorerError {
    /// Recoverable: converted into a result by the runner.
    Failure(ScorerFailure),
    /// Unexpected: propagated to the caller of the pipeline.
    Defect(GradingError),
}

impl fmt::Display for ScorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerError::Failure(failure) => write!(f, "scorer failure: {}", failure.brief.render()),
            ScorerError::Defect(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ScorerError {}

impl From<ScorerFailure> for ScorerError {
    fn from(f: ScorerFailure) -> Self {
        ScorerError::Failure(f)
    }
}

impl From<GradingError> for ScorerError {
    fn from(e: GradingError) -> Self {
        ScorerError::Defect(e)
    }
}

/// Problems found while parsing external data (coverage output, checker output, CSV).
///
/// Callers decide which tier a parse error belongs to; data produced by or about the
/// submission is normally a [`ScorerFailure`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A required field or column is absent.
    MissingField(String),
    /// A value is present but cannot be converted to the expected type.
    InvalidValue(String),
    /// The input does not follow the expected format at all.
    Malformed(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingField(msg) => write!(f, "missing field: {msg}"),
            ParseError::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
            ParseError::Malformed(msg) => write!(f, "malformed input: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}
