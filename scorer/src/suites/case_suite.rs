//! In-process test cases.
//!
//! A [`CaseSuite`] is a named list of closures. Each closure runs on the blocking thread pool so
//! a slow case does not stall the runtime, and a panicking case is recorded as an error instead
//! of tearing down the grader.
//!
//! A blocking thread cannot be cancelled. When a runner time limit expires the scorer is still
//! reported as timed out, but the case that was running keeps its thread until the closure
//! returns on its own; the remaining cases are never started.

use crate::traits::suite::{SuiteReport, TestOutcome, TestSuite};
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Why a case did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    /// An expectation about the code under test did not hold.
    Failure(String),
    /// The case itself could not run.
    Error(String),
}

impl CaseError {
    /// `Ok(())` when `condition` holds, a failure with `text` otherwise.
    pub fn check(condition: bool, text: impl Into<String>) -> Result<(), CaseError> {
        if condition {
            Ok(())
        } else {
            Err(CaseError::Failure(text.into()))
        }
    }
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseError::Failure(text) => write!(f, "failure: {text}"),
            CaseError::Error(text) => write!(f, "error: {text}"),
        }
    }
}

type CaseFn = Arc<dyn Fn() -> Result<(), CaseError> + Send + Sync>;

pub struct CaseSuite {
    name: String,
    cases: Vec<(String, CaseFn)>,
}

/// A type that knows how to build its own suite.
pub trait TestCase {
    fn suite() -> CaseSuite;
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

impl CaseSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn case<F>(mut self, name: impl Into<String>, case: F) -> Self
    where
        F: Fn() -> Result<(), CaseError> + Send + Sync + 'static,
    {
        self.cases.push((name.into(), Arc::new(case)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CaseSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseSuite")
            .field("name", &self.name)
            .field("cases", &self.cases.len())
            .finish()
    }
}

#[async_trait]
impl TestSuite for CaseSuite {
    fn count_test_cases(&self) -> usize {
        self.cases.len()
    }

    async fn run(&self) -> SuiteReport {
        let mut report = SuiteReport::default();
        for (name, case) in &self.cases {
            let id = format!("{}.{}", self.name, name);
            let case = Arc::clone(case);
            let outcome = match tokio::task::spawn_blocking(move || case()).await {
                Ok(Ok(())) => TestOutcome::passed(id),
                Ok(Err(CaseError::Failure(text))) => TestOutcome::failed(id, text),
                Ok(Err(CaseError::Error(text))) => TestOutcome::errored(id, text),
                Err(e) if e.is_panic() => TestOutcome::errored(id, panic_text(e.into_panic())),
                Err(e) => TestOutcome::errored(id, e.to_string()),
            };
            debug!("{} -> {:?}", outcome.id, outcome.status);
            report.push(outcome);
        }
        report
    }
}
