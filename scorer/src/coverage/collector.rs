//! Command-driven coverage collection.
//!
//! [`CommandCollector`] drives an external coverage tool:
//!
//! - `begin` removes stale report data and runs the optional reset command (for example
//!   `lcov --zerocounters` or `coverage erase`).
//! - `collect` runs the optional report command (`gcov -b ...` or `coverage json`) and parses
//!   the data it produced according to [`CoverageFormat`].
//!
//! The instrumented test run itself happens between the two, driven by the coverage scorer's
//! suite.

use crate::coverage::sample::CoverageData;
use crate::error::{GradingError, ScorerError};
use crate::message::Message;
use crate::parsers::coverage_json_parser::CoveragePyJsonParser;
use crate::parsers::gcov_parser::GcovParser;
use crate::result::ScorerFailure;
use crate::traits::collector::CoverageCollector;
use crate::traits::parser::Parser;
use crate::utilities::command::CommandSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Layout of the data a coverage tool leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageFormat {
    /// A directory of `.gcov` files written by `gcov -b`.
    Gcov,
    /// A `coverage json` report file.
    CoveragePyJson,
}

#[derive(Debug, Clone)]
pub struct CommandCollector {
    pub reset: Option<CommandSpec>,
    pub report: Option<CommandSpec>,
    pub data: PathBuf,
    pub format: CoverageFormat,
}

fn no_data(data: &Path) -> ScorerFailure {
    ScorerFailure::new("No coverage data was recorded.").with_detail(
        Message::new("Expected coverage data at {path}").with("path", data.display().to_string()),
    )
}

fn inconsistent(reason: String) -> ScorerFailure {
    ScorerFailure::new("Coverage data is inconsistent")
        .with_detail(Message::new("{reason}").with("reason", reason))
}

async fn run_step(step: &str, spec: &CommandSpec) -> Result<(), ScorerFailure> {
    let output = spec.run(Vec::<String>::new()).await.map_err(|e| {
        warn!("Coverage {} command `{}` could not start: {}", step, spec.display(), e);
        ScorerFailure::new("Coverage tool could not be started.").with_detail(
            Message::new("{command}: {reason}")
                .with("command", spec.display())
                .with("reason", e.to_string()),
        )
    })?;
    if !output.success() {
        warn!("Coverage {} command `{}` exited with {:?}", step, spec.display(), output.status);
        return Err(ScorerFailure::new("Coverage tool reported an error.").with_detail(
            Message::new("{command}\n{output}")
                .with("command", spec.display())
                .with("output", output.combined()),
        ));
    }
    Ok(())
}

fn gcov_files(dir: &Path) -> Result<Vec<PathBuf>, GradingError> {
    Ok(util::paths::dirtree(dir)?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == "gcov"))
        .map(|p| dir.join(p))
        .collect())
}

impl CommandCollector {
    pub fn new(data: impl Into<PathBuf>, format: CoverageFormat) -> Self {
        Self {
            reset: None,
            report: None,
            data: data.into(),
            format,
        }
    }

    pub fn with_reset(mut self, reset: CommandSpec) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn with_report(mut self, report: CommandSpec) -> Self {
        self.report = Some(report);
        self
    }

    async fn clear_stale_data(&self) -> Result<(), GradingError> {
        match self.format {
            CoverageFormat::CoveragePyJson => {
                if self.data.is_file() {
                    tokio::fs::remove_file(&self.data).await?;
                }
            }
            CoverageFormat::Gcov => {
                if self.data.is_dir() {
                    for file in gcov_files(&self.data)? {
                        tokio::fs::remove_file(&file).await?;
                    }
                }
            }
        }
        Ok(())
    }

    async fn read_gcov(&self) -> Result<CoverageData, ScorerError> {
        if !self.data.is_dir() {
            return Err(no_data(&self.data).into());
        }
        let files = gcov_files(&self.data)?;
        if files.is_empty() {
            return Err(no_data(&self.data).into());
        }

        let mut data = CoverageData::new();
        for file in files {
            let text = read_lossy(&file).await?;
            let (source, sample) = GcovParser
                .parse(&text)
                .map_err(|e| inconsistent(format!("{}: {}", file.display(), e)))?;
            debug!("Parsed {} for {}", file.display(), source.display());
            data.insert(&source, sample);
        }
        Ok(data)
    }

    async fn read_coverage_py(&self) -> Result<CoverageData, ScorerError> {
        if !self.data.is_file() {
            return Err(no_data(&self.data).into());
        }
        let text = read_lossy(&self.data).await?;
        CoveragePyJsonParser
            .parse(&text)
            .map_err(|e| inconsistent(e.to_string()).into())
    }
}

/// Coverage data quotes the submitted source, which need not be UTF-8.
async fn read_lossy(path: &Path) -> Result<String, GradingError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait]
impl CoverageCollector for CommandCollector {
    async fn begin(&self) -> Result<(), ScorerError> {
        self.clear_stale_data().await?;
        if let Some(reset) = &self.reset {
            run_step("reset", reset).await?;
        }
        Ok(())
    }

    async fn collect(&self) -> Result<CoverageData, ScorerError> {
        if let Some(report) = &self.report {
            run_step("report", report).await?;
        }
        match self.format {
            CoverageFormat::Gcov => self.read_gcov().await,
            CoverageFormat::CoveragePyJson => self.read_coverage_py().await,
        }
    }
}
