//! Input class scoring.
//!
//! Judges supplied test data rather than code: the CSV records are parsed against a schema and
//! each [`CheckClass`](crate::input::check_class::CheckClass) counts as covered when at least one
//! record satisfies it. `score = 100 * covered / classes`.
//!
//! The class list is never empty; [`CheckClasses`] refuses to be built without a class.

use crate::error::ScorerError;
use crate::input::check_class::CheckClasses;
use crate::input::schema::RecordSchema;
use crate::message::Message;
use crate::parsers::csv_parser::CsvParser;
use crate::result::{ScorerFailure, Verdict};
use crate::scorers::percent;
use crate::traits::parser::Parser;
use crate::traits::scorer::Scorer;
use crate::utilities::file_loader::{MAX_SOURCE_SIZE, read_text};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

enum InputData {
    Inline(String),
    File { path: PathBuf, max_size: u64 },
}

pub struct InputClassScorer {
    schema: RecordSchema,
    data: InputData,
    classes: CheckClasses,
}

impl InputClassScorer {
    /// Score CSV text held in memory.
    pub fn new(schema: RecordSchema, data: impl Into<String>, classes: CheckClasses) -> Self {
        Self {
            schema,
            data: InputData::Inline(data.into()),
            classes,
        }
    }

    /// Score a CSV file, read when the scorer runs.
    pub fn from_file(schema: RecordSchema, path: impl Into<PathBuf>, classes: CheckClasses) -> Self {
        Self {
            schema,
            data: InputData::File {
                path: path.into(),
                max_size: MAX_SOURCE_SIZE,
            },
            classes,
        }
    }

    fn load(&self) -> Result<String, ScorerFailure> {
        match &self.data {
            InputData::Inline(text) => Ok(text.clone()),
            InputData::File { path, max_size } => read_text(path, *max_size),
        }
    }
}

#[async_trait]
impl Scorer for InputClassScorer {
    fn name(&self) -> &str {
        "InputClass Scorer"
    }

    async fn evaluate(&mut self) -> Result<Verdict, ScorerError> {
        let text = self.load()?;
        let records = CsvParser::new(&self.schema).parse(&text).map_err(|e| {
            ScorerFailure::new("CSV data does not match schema.")
                .with_detail(Message::new("{reason}").with("reason", e.to_string()))
        })?;

        let covered = self.classes.coverage(&records);
        let cover = covered.iter().filter(|c| **c).count();
        let total = self.classes.len();
        let score = percent(cover, total, 0.0);
        debug!("{} records cover {} of {} input classes", records.len(), cover, total);

        let brief = Message::new("{rate}% input classes ({cover} out of {total}) covered")
            .with("rate", score)
            .with("cover", cover)
            .with("total", total);
        let detail = self
            .classes
            .iter()
            .zip(&covered)
            .map(|(class, hit)| {
                let template = if *hit {
                    "COVERED: {checker}"
                } else {
                    "NOT COVERED: {checker}"
                };
                Message::new(template).with("checker", class.description())
            })
            .collect();

        Ok(Verdict::new(score, brief, detail))
    }
}
