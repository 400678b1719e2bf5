//! # Scorer Library
//!
//! The grading core: runs independent scoring strategies over a submission and combines them
//! into one weighted score plus a structured report.
//!
//! ## Key Concepts
//! - **Scorer**: one grading dimension (unit tests, code style, coverage, input classes),
//!   configured through its constructor and evaluated once.
//! - **ScorerRunner**: evaluates a scorer with failure isolation and an optional time limit.
//!   Recoverable [`ScorerFailure`](result::ScorerFailure)s become results, defects propagate.
//! - **Pipeline**: the ordered, weighted list of scorers and the public entry point.
//! - **Messages**: all report text is a template plus named parameters, rendered elsewhere.

pub mod coverage;
pub mod error;
pub mod input;
pub mod message;
pub mod parsers;
pub mod pipeline;
pub mod result;
pub mod runner;
pub mod scorers;
pub mod style;
pub mod suites;
pub mod traits;
pub mod utilities;

pub use pipeline::{AggregateReport, Pipeline, WeightedScorer};
pub use runner::ScorerRunner;
