//! # Scorers
//!
//! The four grading dimensions:
//!
//! | scorer                                  | name                     |
//! |-----------------------------------------|--------------------------|
//! | [`unit_test::UnitTestScorer`]           | `Functionality Scorer`   |
//! | [`code_style::CodeStyleScorer`]         | `CodeStyle Scorer`       |
//! | [`coverage::CoverageScorer`]            | `Coverage Scorer`        |
//! | [`input_class::InputClassScorer`]       | `InputClass Scorer`      |
//!
//! Each is configured entirely through its constructor and evaluated once through the
//! [`ScorerRunner`](crate::runner::ScorerRunner).

pub mod code_style;
pub mod coverage;
pub mod input_class;

/// `100 * part / whole`, or `empty` when there is nothing to measure.
pub(crate) fn percent(part: usize, whole: usize, empty: f64) -> f64 {
    if whole == 0 {
        empty
    } else {
        100.0 * part as f64 / whole as f64
    }
}
