//!
//! # Coverage Collector Trait
//!
//! A [`CoverageCollector`] brackets an instrumented test run: `begin` prepares a clean
//! measurement (for example by clearing counters left by a previous run) and `collect` gathers
//! what was recorded. Collectors are only ever driven through an
//! [`InstrumentationSession`](crate::coverage::session::InstrumentationSession), which ensures a
//! single measurement is active in the process at a time.
//!

use crate::coverage::sample::CoverageData;
use crate::error::ScorerError;
use async_trait::async_trait;

#[async_trait]
pub trait CoverageCollector: Send + Sync {
    /// Start a measurement.
    async fn begin(&self) -> Result<(), ScorerError>;

    /// Stop the measurement and return per-file samples.
    async fn collect(&self) -> Result<CoverageData, ScorerError>;
}
