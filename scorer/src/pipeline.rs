//! # Weighted Pipeline
//!
//! The entry point for grading a submission. A [`Pipeline`] holds an ordered list of
//! [`WeightedScorer`]s, runs each through the [`ScorerRunner`] in order, and combines the
//! results into an [`AggregateReport`]:
//!
//! ```text
//! final_score = Σ(score_i * weight_i) / Σ(weight_i)
//! ```
//!
//! Scorers run strictly one after another. Recoverable failures become results; the first
//! [`GradingError`] aborts the pass.
//!
//! ```no_run
//! # async fn grade() -> Result<(), scorer::error::GradingError> {
//! use scorer::pipeline::Pipeline;
//! use scorer::scorers::code_style::CodeStyleScorer;
//! use scorer::style::line_rules::LineRules;
//! use util::languages::Language;
//!
//! let report = Pipeline::new()
//!     .add(
//!         CodeStyleScorer::from_handin_dir("handin", Language::Python, LineRules::new(), ["run.py"]),
//!         0.1,
//!     )
//!     .run()
//!     .await?;
//! println!("{:.2}", report.final_score);
//! # Ok(())
//! # }
//! ```

use crate::error::GradingError;
use crate::result::ScorerResult;
use crate::runner::ScorerRunner;
use crate::traits::scorer::Scorer;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Builds a scorer when its turn comes.
pub type ScorerFactory = Box<dyn FnOnce() -> Result<Box<dyn Scorer>, GradingError> + Send>;

enum ScorerSlot {
    Ready(Box<dyn Scorer>),
    Lazy(ScorerFactory),
}

/// A scorer (or a factory for one) and its strictly positive weight.
pub struct WeightedScorer {
    slot: ScorerSlot,
    weight: f64,
}

impl WeightedScorer {
    pub fn new<S: Scorer + 'static>(scorer: S, weight: f64) -> Self {
        Self {
            slot: ScorerSlot::Ready(Box::new(scorer)),
            weight,
        }
    }

    /// Wrap an already boxed scorer, as built from a configuration file.
    pub fn boxed(scorer: Box<dyn Scorer>, weight: f64) -> Self {
        Self {
            slot: ScorerSlot::Ready(scorer),
            weight,
        }
    }

    pub fn lazy<F>(factory: F, weight: f64) -> Self
    where
        F: FnOnce() -> Result<Box<dyn Scorer>, GradingError> + Send + 'static,
    {
        Self {
            slot: ScorerSlot::Lazy(Box::new(factory)),
            weight,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    fn build(self) -> Result<Box<dyn Scorer>, GradingError> {
        match self.slot {
            ScorerSlot::Ready(scorer) => Ok(scorer),
            ScorerSlot::Lazy(factory) => factory(),
        }
    }
}

/// Ordered results of one grading pass plus the weighted final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub final_score: f64,
    pub results: Vec<ScorerResult>,
}

#[derive(Default)]
pub struct Pipeline {
    scorers: Vec<WeightedScorer>,
    runner: ScorerRunner,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit each scorer's evaluation to `limit`.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.runner = ScorerRunner::new(Some(limit));
        self
    }

    pub fn add<S: Scorer + 'static>(self, scorer: S, weight: f64) -> Self {
        self.push(WeightedScorer::new(scorer, weight))
    }

    pub fn add_lazy<F>(self, factory: F, weight: f64) -> Self
    where
        F: FnOnce() -> Result<Box<dyn Scorer>, GradingError> + Send + 'static,
    {
        self.push(WeightedScorer::lazy(factory, weight))
    }

    pub fn push(mut self, scorer: WeightedScorer) -> Self {
        self.scorers.push(scorer);
        self
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    fn validate(&self) -> Result<(), GradingError> {
        if self.scorers.is_empty() {
            return Err(GradingError::EmptyPipeline);
        }
        for (index, scorer) in self.scorers.iter().enumerate() {
            let weight = scorer.weight;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(GradingError::InvalidWeight(format!(
                    "scorer #{} has weight {}; weights must be finite and greater than zero",
                    index + 1,
                    weight
                )));
            }
        }
        Ok(())
    }

    /// Run every scorer in order and aggregate.
    ///
    /// # Errors
    /// - [`GradingError::EmptyPipeline`] / [`GradingError::InvalidWeight`] before anything runs.
    /// - The first defect raised by a scorer or a scorer factory.
    pub async fn run(self) -> Result<AggregateReport, GradingError> {
        self.validate()?;
        let runner = self.runner;
        info!("Grading with {} scorer(s)", self.scorers.len());

        let mut results = Vec::with_capacity(self.scorers.len());
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for entry in self.scorers {
            let weight = entry.weight;
            let mut scorer = entry.build()?;
            let result = runner.run(scorer.as_mut()).await?;
            debug!("{}: {:.2} x {}", result.name, result.score, weight);
            weighted_sum += result.score * weight;
            weight_sum += weight;
            results.push(result);
        }

        let final_score = weighted_sum / weight_sum;
        info!("Final score {:.2}", final_score);
        Ok(AggregateReport {
            final_score,
            results,
        })
    }
}
