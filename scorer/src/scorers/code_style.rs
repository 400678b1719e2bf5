//! Code style scoring.
//!
//! Checks the submission's source files of one language and scores the share of files without
//! any violation. No files to check is a full score.

use crate::error::ScorerError;
use crate::message::{Message, Param};
use crate::result::{ScorerFailure, Verdict};
use crate::scorers::percent;
use crate::traits::scorer::Scorer;
use crate::traits::style_checker::{FileViolations, StyleChecker};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use util::languages::{Language, LanguageExt};
use util::paths::{dirtree, to_slash};

type SkipFn = Box<dyn Fn(&Path) -> bool + Send + Sync>;

/// Where the candidate files come from.
enum Targets {
    Listed(Vec<PathBuf>),
    /// Every file under `root`, minus the relative paths in `ignore`. Listed at evaluation.
    HandinDir { root: PathBuf, ignore: Vec<String> },
}

pub struct CodeStyleScorer {
    targets: Targets,
    language: Language,
    checker: Box<dyn StyleChecker>,
    skip: Option<SkipFn>,
}

fn violation_lines(file: &FileViolations) -> String {
    file.violations
        .iter()
        .map(|v| {
            let mut line = format!("{}:{}: {} {}", v.line, v.column, v.code, v.text);
            if let Some(source) = &v.source_line {
                line.push_str("\n    ");
                line.push_str(source.trim_end());
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl CodeStyleScorer {
    pub fn new<C: StyleChecker + 'static>(
        files: Vec<PathBuf>,
        language: Language,
        checker: C,
    ) -> Self {
        Self {
            targets: Targets::Listed(files),
            language,
            checker: Box::new(checker),
            skip: None,
        }
    }

    /// Check every `language` file under `root` except the relative paths in `ignore`
    /// (for example the harness's own driver script).
    pub fn from_handin_dir<C, I, S>(
        root: impl Into<PathBuf>,
        language: Language,
        checker: C,
        ignore: I,
    ) -> Self
    where
        C: StyleChecker + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: Targets::HandinDir {
                root: root.into(),
                ignore: ignore.into_iter().map(Into::into).collect(),
            },
            language,
            checker: Box::new(checker),
            skip: None,
        }
    }

    /// Exclude files for which `skip` returns true.
    pub fn with_skip<F>(mut self, skip: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.skip = Some(Box::new(skip));
        self
    }

    fn candidates(&self) -> Result<Vec<PathBuf>, ScorerFailure> {
        let files = match &self.targets {
            Targets::Listed(files) => files.clone(),
            Targets::HandinDir { root, ignore } => dirtree(root)
                .map_err(|e| {
                    ScorerFailure::new("Submission directory could not be read.").with_detail(
                        Message::new("{path}: {reason}")
                            .with("path", root.display().to_string())
                            .with("reason", e.to_string()),
                    )
                })?
                .into_iter()
                .filter(|rel| !ignore.iter().any(|i| *i == to_slash(rel)))
                .map(|rel| root.join(rel))
                .collect(),
        };

        Ok(files
            .into_iter()
            .filter(|p| self.language.is_source_file(p))
            .filter(|p| !self.skip.as_ref().is_some_and(|skip| skip(p.as_path())))
            .collect())
    }

    fn display(&self, path: &Path) -> String {
        match &self.targets {
            Targets::HandinDir { root, .. } => to_slash(path.strip_prefix(root).unwrap_or(path)),
            Targets::Listed(_) => to_slash(path),
        }
    }
}

#[async_trait]
impl Scorer for CodeStyleScorer {
    fn name(&self) -> &str {
        "CodeStyle Scorer"
    }

    async fn evaluate(&mut self) -> Result<Verdict, ScorerError> {
        let files = self.candidates()?;
        let total = files.len();
        if total == 0 {
            debug!("No files to style-check");
            return Ok(Verdict::new(
                100.0,
                Message::new("All files passed the code style check"),
                Vec::new(),
            ));
        }

        let report = self.checker.check_files(&files).await?;
        let trouble = report.count_trouble_files();
        let score = percent(total - trouble, total, 100.0);
        debug!(
            "{} of {} files have style violations ({} total)",
            trouble,
            total,
            report.total_violations()
        );

        let brief = if trouble == 0 {
            Message::new("All files passed the code style check")
        } else {
            Message::new("{rate}% files ({trouble} out of {total}) did not pass the code style check")
                .with("rate", Param::Float(100.0 - score))
                .with("trouble", trouble)
                .with("total", total)
        };

        let detail = report
            .files
            .iter()
            .filter(|f| !f.is_clean())
            .map(|f| {
                Message::new("{file}\n{violations}")
                    .with("file", self.display(&f.path))
                    .with("violations", violation_lines(f))
            })
            .collect();

        Ok(Verdict::new(score, brief, detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::line_rules::LineRules;
    use crate::traits::style_checker::{StyleReport, Violation};
    use util::test_helpers::setup_handin_dir;

    /// Flags every file whose name starts with `bad`.
    struct NameChecker;

    #[async_trait]
    impl StyleChecker for NameChecker {
        async fn check_files(&self, files: &[PathBuf]) -> Result<StyleReport, ScorerError> {
            let found = files
                .iter()
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("bad"))
                })
                .map(|p| {
                    (
                        p.clone(),
                        Violation {
                            line: 1,
                            column: 1,
                            code: "E000".into(),
                            text: "bad name".into(),
                            source_line: None,
                        },
                    )
                })
                .collect();
            Ok(StyleReport::group(files, found))
        }
    }

    #[tokio::test]
    async fn test_five_files_one_in_trouble() {
        let files = ["a.py", "b.py", "c.py", "d.py", "bad.py"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let mut scorer = CodeStyleScorer::new(files, Language::Python, NameChecker);
        let verdict = scorer.evaluate().await.unwrap();
        assert!((verdict.score - 80.0).abs() < 1e-9);
        assert_eq!(
            verdict.brief.render(),
            "20.00% files (1 out of 5) did not pass the code style check"
        );
        assert_eq!(verdict.detail.len(), 1);
        assert_eq!(verdict.detail[0].render(), "bad.py\n1:1: E000 bad name");
    }

    #[tokio::test]
    async fn test_no_files_is_full_score() {
        let files = vec![PathBuf::from("README.md")];
        let mut scorer = CodeStyleScorer::new(files, Language::Python, NameChecker);
        let verdict = scorer.evaluate().await.unwrap();
        assert_eq!(verdict.score, 100.0);
        assert_eq!(verdict.brief.render(), "All files passed the code style check");
    }

    #[tokio::test]
    async fn test_skip_predicate() {
        let files = vec![PathBuf::from("run.py"), PathBuf::from("bad.py")];
        let mut scorer = CodeStyleScorer::new(files, Language::Python, NameChecker)
            .with_skip(|p| p.starts_with("bad.py"));
        let verdict = scorer.evaluate().await.unwrap();
        assert_eq!(verdict.score, 100.0);
    }

    #[tokio::test]
    async fn test_from_handin_dir_with_line_rules() {
        let dir = setup_handin_dir(&[
            ("run.py", "x = 1   \n"),
            ("myfunc.py", "def f():\n    return 1\n"),
            ("pkg/util.py", "y = 2"),
            ("notes.txt", "not python  \n"),
        ]);
        let mut scorer = CodeStyleScorer::from_handin_dir(
            dir.path(),
            Language::Python,
            LineRules::new(),
            ["run.py"],
        );
        let verdict = scorer.evaluate().await.unwrap();
        assert!((verdict.score - 50.0).abs() < 1e-9);
        assert_eq!(verdict.detail.len(), 1);
        assert!(verdict.detail[0].render().starts_with("pkg/util.py\n1:6: W292"));
    }

    #[tokio::test]
    async fn test_missing_handin_dir_is_failure() {
        let mut scorer = CodeStyleScorer::from_handin_dir(
            "/definitely/not/here/4711",
            Language::Python,
            LineRules::new(),
            Vec::<String>::new(),
        );
        assert!(matches!(
            scorer.evaluate().await,
            Err(ScorerError::Failure(_))
        ));
    }
}
