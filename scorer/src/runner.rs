//! # Scorer Runner
//!
//! Evaluates one scorer with failure isolation:
//!
//! - a verdict becomes a completed [`ScorerResult`] with the measured elapsed time;
//! - a [`ScorerFailure`] is absorbed into a result carrying the failure's score, brief and
//!   detail, with no elapsed time;
//! - a [`GradingError`] is logged and returned to the caller.
//!
//! With a time limit set, an evaluation that runs too long is dropped (killing any child
//! processes it spawned and releasing any instrumentation it held) and reported as a failure.
//! Work already handed to the blocking thread pool, such as an in-process test case, is not
//! cancelled and finishes in the background.

use crate::error::{GradingError, ScorerError};
use crate::message::{Message, Param};
use crate::result::{ScorerFailure, ScorerResult};
use crate::traits::scorer::Scorer;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScorerRunner {
    time_limit: Option<Duration>,
}

fn timed_out(limit: Duration) -> ScorerFailure {
    let seconds = if limit.subsec_nanos() == 0 {
        Param::Int(limit.as_secs() as i64)
    } else {
        Param::Float(limit.as_secs_f64())
    };
    ScorerFailure::new(
        Message::new("did not complete within the time limit of {seconds} seconds")
            .with("seconds", seconds),
    )
}

impl ScorerRunner {
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self { time_limit }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Evaluate `scorer` once.
    ///
    /// # Errors
    /// The [`GradingError`] of a scorer that hit a defect. Recoverable failures never error.
    pub async fn run(&self, scorer: &mut dyn Scorer) -> Result<ScorerResult, GradingError> {
        let name = scorer.name().to_string();
        info!("Running {}", name);

        let start = Instant::now();
        let outcome = match self.time_limit {
            Some(limit) => tokio::time::timeout(limit, scorer.evaluate())
                .await
                .unwrap_or_else(|_| Err(timed_out(limit).into())),
            None => scorer.evaluate().await,
        };
        let elapsed = start.elapsed();

        match outcome {
            Ok(verdict) => {
                info!(
                    "{} finished with score {:.2} in {:.3}s",
                    name,
                    verdict.score,
                    elapsed.as_secs_f64()
                );
                Ok(ScorerResult::completed(name, verdict, elapsed))
            }
            Err(ScorerError::Failure(failure)) => {
                warn!(
                    "{} failed: {} (score {:.2})",
                    name,
                    failure.brief.render(),
                    failure.score
                );
                Ok(ScorerResult::failed(name, failure))
            }
            Err(ScorerError::Defect(err)) => {
                error!("{} aborted grading: {}", name, err);
                Err(err)
            }
        }
    }
}
