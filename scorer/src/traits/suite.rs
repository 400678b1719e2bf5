//!
//! # Test Suite Trait
//!
//! A [`TestSuite`] is anything that can run a collection of tests and report one
//! [`TestOutcome`] per test. The unit-test scorer scores those outcomes; the coverage scorer
//! runs the suite only to exercise the code under instrumentation.
//!
//! Suites are handed to scorers through a [`SuiteSource`], which either holds a ready suite or a
//! factory that builds it when the scorer runs. Deferring construction moves discovery
//! failures (missing test files, unreadable directories) into the scorer's evaluation, where
//! they are reported as failures instead of escaping from a constructor.
//!

use crate::error::{GradingError, ScorerError};
use async_trait::async_trait;
use serde::Serialize;

/// The three possible outcomes of a single test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    /// An assertion did not hold.
    Failed(String),
    /// The test could not run to completion (crash, panic, missing runner).
    Errored(String),
}

/// The outcome of one test, identified by its fully-qualified id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    pub id: String,
    pub status: TestStatus,
}

impl TestOutcome {
    pub fn passed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TestStatus::Passed,
        }
    }

    pub fn failed(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TestStatus::Failed(text.into()),
        }
    }

    pub fn errored(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TestStatus::Errored(text.into()),
        }
    }
}

/// Ordered outcomes of one suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub outcomes: Vec<TestOutcome>,
}

impl SuiteReport {
    pub fn push(&mut self, outcome: TestOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn errors(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TestStatus::Errored(_)))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TestStatus::Failed(_)))
            .count()
    }
}

/// A runnable collection of tests.
#[async_trait]
pub trait TestSuite: Send + Sync {
    /// Number of tests the suite will run.
    fn count_test_cases(&self) -> usize;

    /// Run every test and collect the outcomes in execution order.
    async fn run(&self) -> SuiteReport;
}

/// Builds a suite when the scorer runs.
pub type SuiteFactory = Box<dyn FnOnce() -> Result<Box<dyn TestSuite>, ScorerError> + Send>;

/// Either a ready suite or a deferred factory; resolved once at the start of evaluation.
pub enum SuiteSource {
    Eager(Box<dyn TestSuite>),
    Deferred(Option<SuiteFactory>),
}

impl SuiteSource {
    pub fn eager<S: TestSuite + 'static>(suite: S) -> Self {
        SuiteSource::Eager(Box::new(suite))
    }

    pub fn deferred<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn TestSuite>, ScorerError> + Send + 'static,
    {
        SuiteSource::Deferred(Some(Box::new(factory)))
    }

    /// Build the suite if needed and return it. Later calls reuse the built suite.
    pub fn resolve(&mut self) -> Result<&dyn TestSuite, ScorerError> {
        if let SuiteSource::Deferred(factory) = self {
            let factory = factory.take().ok_or_else(|| {
                GradingError::Internal("suite factory was consumed by a failed build".into())
            })?;
            *self = SuiteSource::Eager(factory()?);
        }

        match self {
            SuiteSource::Eager(suite) => Ok(&**suite),
            SuiteSource::Deferred(_) => {
                Err(GradingError::Internal("suite source left unresolved".into()).into())
            }
        }
    }
}

impl std::fmt::Debug for SuiteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuiteSource::Eager(suite) => write!(f, "Eager({} tests)", suite.count_test_cases()),
            SuiteSource::Deferred(Some(_)) => f.write_str("Deferred"),
            SuiteSource::Deferred(None) => f.write_str("Deferred(consumed)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ScorerFailure;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSuite(usize);

    #[async_trait]
    impl TestSuite for FixedSuite {
        fn count_test_cases(&self) -> usize {
            self.0
        }

        async fn run(&self) -> SuiteReport {
            SuiteReport::default()
        }
    }

    #[test]
    fn test_report_counts() {
        let report = SuiteReport {
            outcomes: vec![
                TestOutcome::passed("a"),
                TestOutcome::failed("b", "assert"),
                TestOutcome::errored("c", "panic"),
                TestOutcome::errored("d", "panic"),
            ],
        };
        assert_eq!(report.errors(), 2);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn test_eager_source_resolves_to_its_suite() {
        let mut source = SuiteSource::eager(FixedSuite(2));
        assert_eq!(source.resolve().unwrap().count_test_cases(), 2);
        assert_eq!(source.resolve().unwrap().count_test_cases(), 2);
    }

    #[test]
    fn test_deferred_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut source = SuiteSource::deferred(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FixedSuite(3)) as Box<dyn TestSuite>)
        });

        assert_eq!(source.resolve().unwrap().count_test_cases(), 3);
        assert_eq!(source.resolve().unwrap().count_test_cases(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deferred_factory_failure_is_returned() {
        let mut source = SuiteSource::deferred(|| {
            Err(ScorerFailure::new("No test modules were found.").into())
        });
        assert!(matches!(source.resolve(), Err(ScorerError::Failure(_))));
        // the factory is gone; a second resolve reports a defect rather than rebuilding
        assert!(matches!(source.resolve(), Err(ScorerError::Defect(_))));
    }
}
