//! Built-in physical-line style rules.
//!
//! | code   | check                                   |
//! |--------|-----------------------------------------|
//! | `E501` | line longer than `max_line_length`      |
//! | `W191` | indentation contains tabs               |
//! | `W291` | trailing whitespace                     |
//! | `W293` | whitespace on a blank line              |
//! | `W292` | no newline at end of file               |
//! | `W391` | blank line at end of file               |

use crate::error::ScorerError;
use crate::traits::style_checker::{StyleChecker, StyleReport, Violation};
use crate::utilities::file_loader::{MAX_SOURCE_SIZE, read_text};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_MAX_LINE_LENGTH: usize = 79;

#[derive(Debug, Clone)]
pub struct LineRules {
    pub max_line_length: usize,
    /// Codes that are never reported.
    pub ignore: BTreeSet<String>,
    pub max_file_size: u64,
}

impl Default for LineRules {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            ignore: BTreeSet::new(),
            max_file_size: MAX_SOURCE_SIZE,
        }
    }
}

fn violation(line: usize, column: usize, code: &str, text: String, source: &str) -> Violation {
    Violation {
        line: line as u32,
        column: column as u32,
        code: code.to_string(),
        text,
        source_line: Some(source.to_string()),
    }
}

impl LineRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    pub fn ignoring<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Check one file's text.
    pub fn check_source(&self, source: &str) -> Vec<Violation> {
        let mut found = Vec::new();
        let lines: Vec<&str> = source
            .split_inclusive('\n')
            .map(|l| l.trim_end_matches('\n').trim_end_matches('\r'))
            .collect();

        for (i, line) in lines.iter().enumerate() {
            let number = i + 1;
            let stripped = line.trim_end();
            let length = line.chars().count();

            if length > self.max_line_length {
                found.push(violation(
                    number,
                    self.max_line_length + 1,
                    "E501",
                    format!(
                        "line too long ({} > {} characters)",
                        length, self.max_line_length
                    ),
                    line,
                ));
            }

            let indent: &str = &line[..line.len() - line.trim_start().len()];
            if indent.contains('\t') {
                found.push(violation(
                    number,
                    1,
                    "W191",
                    "indentation contains tabs".to_string(),
                    line,
                ));
            }

            if stripped.len() != line.len() {
                if stripped.is_empty() {
                    found.push(violation(
                        number,
                        1,
                        "W293",
                        "whitespace on blank line".to_string(),
                        line,
                    ));
                } else {
                    found.push(violation(
                        number,
                        stripped.chars().count() + 1,
                        "W291",
                        "trailing whitespace".to_string(),
                        line,
                    ));
                }
            }
        }

        if let Some(last) = lines.last() {
            let number = lines.len();
            if !source.ends_with('\n') {
                found.push(violation(
                    number,
                    last.chars().count() + 1,
                    "W292",
                    "no newline at end of file".to_string(),
                    last,
                ));
            } else if last.trim().is_empty() {
                found.push(violation(
                    number,
                    1,
                    "W391",
                    "blank line at end of file".to_string(),
                    last,
                ));
            }
        }

        found.retain(|v| !self.ignore.contains(&v.code));
        found.sort_by_key(|v| (v.line, v.column));
        found
    }
}

#[async_trait]
impl StyleChecker for LineRules {
    async fn check_files(&self, files: &[PathBuf]) -> Result<StyleReport, ScorerError> {
        let mut violations = Vec::new();
        for path in files {
            let source = read_text(path, self.max_file_size)?;
            violations.extend(
                self.check_source(&source)
                    .into_iter()
                    .map(|v| (path.clone(), v)),
            );
        }
        Ok(StyleReport::group(files, violations))
    }
}
