//! # Coverage
//!
//! Everything the coverage scorer needs besides the scorer itself:
//!
//! - [`sample`]: the per-file data model recorded by an instrumented run.
//! - [`collector`]: gathering samples from external coverage tools.
//! - [`session`]: exclusive, scoped ownership of the process-wide instrumentation.
//! - [`analyzer`]: statistics, the composite score and annotated listings.

pub mod analyzer;
pub mod collector;
pub mod sample;
pub mod session;
