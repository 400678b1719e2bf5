//! Instrumentation Session
//!
//! Coverage instrumentation is a process-wide resource: counters written by one instrumented
//! run would be mixed into another's if two measurements overlapped. An
//! [`InstrumentationSession`] owns that resource for the duration of one coverage scorer run.
//!
//! The session holds a global async lock from [`InstrumentationSession::acquire`] until it is
//! dropped. It is dropped on every exit path (a completed `finish`, an early `?` return, or a
//! cancelled future when the runner's time limit expires), so the lock is always released.

use crate::coverage::sample::CoverageData;
use crate::error::ScorerError;
use crate::traits::collector::CoverageCollector;
use std::sync::LazyLock;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

static INSTRUMENTATION: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Exclusive ownership of coverage instrumentation.
pub struct InstrumentationSession<'c> {
    collector: &'c dyn CoverageCollector,
    _guard: MutexGuard<'static, ()>,
}

impl<'c> InstrumentationSession<'c> {
    /// Wait for exclusive access, then start a measurement with `collector`.
    ///
    /// If `begin` fails the lock is released before the error is returned.
    pub async fn acquire(collector: &'c dyn CoverageCollector) -> Result<Self, ScorerError> {
        let guard = INSTRUMENTATION.lock().await;
        debug!("Coverage instrumentation acquired");
        collector.begin().await?;
        Ok(Self {
            collector,
            _guard: guard,
        })
    }

    /// Stop the measurement and return what was recorded. Releases the lock.
    pub async fn finish(self) -> Result<CoverageData, ScorerError> {
        let data = self.collector.collect().await;
        debug!("Coverage instrumentation released");
        data
    }
}
