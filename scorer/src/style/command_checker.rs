//! External style checker.
//!
//! Runs a linter (`pycodestyle`, `flake8`, `cpplint`, ...) over the file list and parses its
//! output with [`StyleOutputParser`]. Linters exit non-zero whenever they find something, so the
//! exit status is ignored; only a linter that cannot be started is a failure.

use crate::error::ScorerError;
use crate::message::Message;
use crate::parsers::style_parser::StyleOutputParser;
use crate::result::ScorerFailure;
use crate::traits::parser::Parser;
use crate::traits::style_checker::{StyleChecker, StyleReport};
use crate::utilities::command::CommandSpec;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CommandStyleChecker {
    pub command: CommandSpec,
}

impl CommandStyleChecker {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }

    /// `pycodestyle --show-source`.
    pub fn pycodestyle() -> Self {
        Self::new(CommandSpec::new("pycodestyle").arg("--show-source"))
    }
}

/// Fill in the offending line for violations the checker reported without source.
fn attach_sources(report: &mut StyleReport) {
    for file in &mut report.files {
        if file.violations.iter().all(|v| v.source_line.is_some()) {
            continue;
        }
        let Ok(text) = std::fs::read_to_string(&file.path) else {
            continue;
        };
        let lines: Vec<&str> = text.lines().collect();
        for v in file.violations.iter_mut().filter(|v| v.source_line.is_none()) {
            v.source_line = lines
                .get((v.line as usize).saturating_sub(1))
                .map(|l| l.to_string());
        }
    }
}

#[async_trait]
impl StyleChecker for CommandStyleChecker {
    async fn check_files(&self, files: &[PathBuf]) -> Result<StyleReport, ScorerError> {
        if files.is_empty() {
            return Ok(StyleReport::default());
        }

        let output = self.command.run(files).await.map_err(|e| {
            warn!("Style checker `{}` could not start: {}", self.command.display(), e);
            ScorerFailure::new("Style checker could not be started.").with_detail(
                Message::new("{command}: {reason}")
                    .with("command", self.command.display())
                    .with("reason", e.to_string()),
            )
        })?;
        debug!(
            "Style checker `{}` exited with {:?}",
            self.command.display(),
            output.status
        );

        let violations = StyleOutputParser.parse(&output.stdout).map_err(|e| {
            ScorerFailure::new("Style checker output could not be read.")
                .with_detail(Message::new("{reason}").with("reason", e.to_string()))
        })?;

        let mut report = StyleReport::group(files, violations);
        attach_sources(&mut report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::test_helpers::setup_handin_dir;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_parses_checker_output_and_attaches_source() {
        let dir = setup_handin_dir(&[("a.py", "x=1\ny = 2\n"), ("b.py", "z = 3\n")]);
        let a = dir.path().join("a.py");
        let b = dir.path().join("b.py");
        // fake linter: complains about line 1 of its first argument, exits 1
        let checker = CommandStyleChecker::new(
            CommandSpec::new("sh")
                .arg("-c")
                .arg("echo \"$1:1:2: E225 missing whitespace around operator\"; exit 1")
                .arg("lint"),
        );

        let report = checker.check_files(&[a.clone(), b]).await.unwrap();
        assert_eq!(report.count_trouble_files(), 1);
        let v = &report.files[0].violations[0];
        assert_eq!(v.code, "E225");
        assert_eq!(v.column, 2);
        assert_eq!(v.source_line.as_deref(), Some("x=1"));
    }

    #[tokio::test]
    async fn test_missing_checker_is_failure() {
        let dir = setup_handin_dir(&[("a.py", "x = 1\n")]);
        let checker = CommandStyleChecker::new(CommandSpec::new("definitely-not-a-linter-4711"));
        let result = checker.check_files(&[dir.path().join("a.py")]).await;
        assert!(matches!(result, Err(ScorerError::Failure(_))));
    }
}
