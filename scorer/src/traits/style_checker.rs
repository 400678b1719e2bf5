//!
//! # Style Checker Trait
//!
//! A [`StyleChecker`] inspects a list of source files and reports every style violation it
//! finds, grouped by file in the order the files were given.
//!

use crate::error::ScorerError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One style violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// Checker code, e.g. `E501`.
    pub code: String,
    pub text: String,
    /// The offending source line, when the checker shows source.
    pub source_line: Option<String>,
}

/// Violations found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileViolations {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
}

impl FileViolations {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Result of checking a file list. Holds one entry per checked file, clean ones included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleReport {
    pub files: Vec<FileViolations>,
}

impl StyleReport {
    /// Build a report for `files`, in that order, distributing `violations` by path.
    /// Violations for paths outside `files` are dropped.
    pub fn group(files: &[PathBuf], violations: Vec<(PathBuf, Violation)>) -> Self {
        let mut report = StyleReport {
            files: files
                .iter()
                .map(|p| FileViolations {
                    path: p.clone(),
                    violations: Vec::new(),
                })
                .collect(),
        };
        for (path, violation) in violations {
            if let Some(entry) = report.entry_mut(&path) {
                entry.violations.push(violation);
            }
        }
        for entry in &mut report.files {
            entry.violations.sort_by_key(|v| (v.line, v.column));
        }
        report
    }

    fn entry_mut(&mut self, path: &Path) -> Option<&mut FileViolations> {
        let wanted = util::paths::normalize(path);
        self.files
            .iter_mut()
            .find(|f| util::paths::normalize(&f.path) == wanted)
    }

    /// Number of files with at least one violation.
    pub fn count_trouble_files(&self) -> usize {
        self.files.iter().filter(|f| !f.is_clean()).count()
    }

    pub fn total_violations(&self) -> usize {
        self.files.iter().map(|f| f.violations.len()).sum()
    }
}

/// A static style checker.
#[async_trait]
pub trait StyleChecker: Send + Sync {
    /// Check every file in `files`.
    ///
    /// # Errors
    /// A [`ScorerError::Failure`] when the checker cannot be run or its output is unusable.
    async fn check_files(&self, files: &[PathBuf]) -> Result<StyleReport, ScorerError>;
}
