//!
//! # Scorer Trait
//!
//! Every grading dimension (functionality, code style, coverage, input classes) is a
//! [`Scorer`]. A scorer is constructed with all of its configuration and then evaluated once
//! by the [`ScorerRunner`](crate::runner::ScorerRunner), which measures time and applies the
//! failure-isolation policy.
//!

use crate::error::ScorerError;
use crate::result::Verdict;
use async_trait::async_trait;

/// A single grading dimension.
///
/// Implementors only decide the verdict. They must not catch their own recoverable failures:
/// returning `Err(ScorerError::Failure(..))` is the way to report a check that could not
/// complete, and the runner turns it into a result.
#[async_trait]
pub trait Scorer: Send {
    /// Human-readable name of the dimension, e.g. `"Coverage Scorer"`.
    fn name(&self) -> &str;

    /// Perform the check and produce a verdict.
    ///
    /// # Errors
    /// - [`ScorerError::Failure`] when the submission prevents a verdict.
    /// - [`ScorerError::Defect`] when the grading logic or its configuration is broken.
    async fn evaluate(&mut self) -> Result<Verdict, ScorerError>;
}
