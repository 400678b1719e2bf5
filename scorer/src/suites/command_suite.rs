//! External test commands.
//!
//! A [`CommandSuite`] runs its runner command once per fully-qualified test name, appending
//! the name as the last argument (`python -m unittest pkg.test_sign`, `./run_test test_sign`).
//! The exit status decides the outcome:
//!
//! | status            | outcome |
//! |-------------------|---------|
//! | 0                 | passed  |
//! | 1                 | failed  |
//! | anything else     | errored |
//! | could not start   | errored |

use crate::error::{GradingError, ScorerError};
use crate::message::Message;
use crate::result::ScorerFailure;
use crate::traits::suite::{SuiteReport, TestOutcome, TestSuite};
use crate::utilities::command::CommandSpec;
use async_trait::async_trait;
use regex::Regex;
use std::path::{Component, Path};
use tracing::{debug, info, warn};
use util::languages::{Language, LanguageExt};
use util::paths::{dirtree, to_slash};

#[derive(Debug, Clone)]
pub struct CommandSuite {
    runner: CommandSpec,
    names: Vec<String>,
}

/// `a/b/test_x.py` becomes `a.b.test_x`.
pub fn module_name(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl CommandSuite {
    pub fn from_names<I, S>(runner: CommandSpec, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            runner,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Find the test modules under `root` and build a suite running each of them.
    ///
    /// A file qualifies when it is a `language` source file and its slash-separated path
    /// relative to `root` matches `pattern` (the language default when `None`). The match is
    /// anchored at the start of the path, so `test_.*\.py$` accepts `test_sign.py` but neither
    /// `latest_version.py` nor `pkg/test_sign.py`. The runner works in `root` unless it names
    /// its own directory.
    ///
    /// # Errors
    /// - [`GradingError::InvalidConfig`] for an invalid pattern.
    /// - A [`ScorerFailure`] when `root` cannot be listed.
    pub fn discover(
        root: &Path,
        language: Language,
        pattern: Option<&str>,
        mut runner: CommandSpec,
    ) -> Result<Self, ScorerError> {
        let pattern = pattern.unwrap_or(language.default_test_pattern());
        let matcher = Regex::new(&format!("^(?:{pattern})")).map_err(|e| {
            GradingError::InvalidConfig(format!("invalid test pattern '{pattern}': {e}"))
        })?;

        let files = dirtree(root).map_err(|e| {
            warn!("Cannot list submission directory {}: {}", root.display(), e);
            ScorerFailure::new("Submission directory could not be read.").with_detail(
                Message::new("{path}: {reason}")
                    .with("path", root.display().to_string())
                    .with("reason", e.to_string()),
            )
        })?;

        let names: Vec<String> = files
            .iter()
            .filter(|p| language.is_source_file(p) && matcher.is_match(&to_slash(p)))
            .map(|p| module_name(p))
            .collect();
        if names.is_empty() {
            warn!("No test modules matching '{}' under {}", pattern, root.display());
        } else {
            info!("Discovered {} test module(s) under {}", names.len(), root.display());
        }

        if runner.workdir.is_none() {
            runner.workdir = Some(root.to_path_buf());
        }
        Ok(Self::from_names(runner, names))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[async_trait]
impl TestSuite for CommandSuite {
    fn count_test_cases(&self) -> usize {
        self.names.len()
    }

    async fn run(&self) -> SuiteReport {
        let mut report = SuiteReport::default();
        for name in &self.names {
            let outcome = match self.runner.run([name]).await {
                Ok(output) => match output.status {
                    Some(0) => TestOutcome::passed(name),
                    Some(1) => TestOutcome::failed(name, output.combined()),
                    status => {
                        let status = status.map_or("signal".to_string(), |c| c.to_string());
                        TestOutcome::errored(
                            name,
                            format!("exit status {status}\n{}", output.combined()),
                        )
                    }
                },
                Err(e) => TestOutcome::errored(
                    name,
                    format!("could not start `{}`: {}", self.runner.display(), e),
                ),
            };
            debug!("{} -> {:?}", outcome.id, outcome.status);
            report.push(outcome);
        }
        report
    }
}
