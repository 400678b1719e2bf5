//! # Result Types
//!
//! [`Verdict`] is what a scorer produces when its check completes, [`ScorerFailure`] is what it
//! raises when the check cannot complete, and [`ScorerResult`] is the immutable report entry the
//! runner builds from either of them.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "name": "Functionality Scorer",
//!   "score": 70.0,
//!   "brief": { "template": "{rate}% tests ({success} of {total}) passed.", "params": { ... } },
//!   "detail": [ { "template": "...", "params": { ... } } ],
//!   "elapsed": 0.41
//! }
//! ```

use crate::message::Message;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Outcome of a completed check.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub score: f64,
    pub brief: Message,
    pub detail: Vec<Message>,
}

impl Verdict {
    pub fn new(score: f64, brief: Message, detail: Vec<Message>) -> Self {
        Self {
            score,
            brief,
            detail,
        }
    }
}

/// A recoverable failure: the check could not complete and is scored as `score` (0 by default).
#[derive(Debug, Clone, PartialEq)]
pub struct ScorerFailure {
    pub brief: Message,
    pub detail: Vec<Message>,
    pub score: f64,
}

impl ScorerFailure {
    pub fn new(brief: impl Into<Message>) -> Self {
        Self {
            brief: brief.into(),
            detail: Vec::new(),
            score: 0.0,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Message>) -> Self {
        self.detail.push(detail.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// One scorer's entry in the aggregate report. Written once by the runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorerResult {
    pub name: String,
    pub score: f64,
    pub brief: Message,
    pub detail: Vec<Message>,
    /// Wall-clock time of a completed evaluation; `None` when the check failed.
    #[serde(serialize_with = "serialize_elapsed")]
    pub elapsed: Option<Duration>,
}

impl ScorerResult {
    pub(crate) fn completed(name: String, verdict: Verdict, elapsed: Duration) -> Self {
        Self {
            name,
            score: verdict.score,
            brief: verdict.brief,
            detail: verdict.detail,
            elapsed: Some(elapsed),
        }
    }

    pub(crate) fn failed(name: String, failure: ScorerFailure) -> Self {
        Self {
            name,
            score: failure.score,
            brief: failure.brief,
            detail: failure.detail,
            elapsed: None,
        }
    }

    /// Did the underlying check complete?
    pub fn completed_ok(&self) -> bool {
        self.elapsed.is_some()
    }
}

fn serialize_elapsed<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => s.serialize_some(&d.as_secs_f64()),
        None => s.serialize_none(),
    }
}
