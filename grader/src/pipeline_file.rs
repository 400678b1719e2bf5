//! Pipeline description file.
//!
//! The harness reads one JSON file naming the submission directory, its language, the
//! execution limits and the ordered scorer entries:
//!
//! ```json
//! {
//!   "root": "handin",
//!   "project": { "language": "python" },
//!   "execution": { "timeout_secs": 120 },
//!   "scorers": [
//!     { "kind": "unit_test", "weight": 0.5,
//!       "runner": { "program": "python3", "args": ["-m", "unittest"] } },
//!     { "kind": "code_style", "weight": 0.1, "ignore": ["run.py"] },
//!     { "kind": "coverage", "weight": 0.4,
//!       "runner": { "program": "coverage", "args": ["run", "--branch", "-a", "-m", "unittest"] },
//!       "files": ["myfunc.py"],
//!       "reset": { "program": "coverage", "args": ["erase"] },
//!       "report": { "program": "coverage", "args": ["json", "-o", "coverage-data.json"] },
//!       "data": "coverage-data.json", "format": "coverage_py_json" }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the pipeline file (`root`) or
//! against `root` (everything inside a scorer entry). Without an `execution` block the time
//! limit comes from `SCORER_TIMEOUT_SECS`; without `artifact` the coverage report goes to
//! `COVERAGE_ARTIFACT` (an empty value disables it).
//!
//! A `code_style` entry without a `checker` runs `pycodestyle` for Python submissions and the
//! built-in line rules for every other language. `"line_rules": true` selects the line rules
//! for Python too.

use scorer::coverage::collector::{CommandCollector, CoverageFormat};
use scorer::error::GradingError;
use scorer::pipeline::{Pipeline, WeightedScorer};
use scorer::scorers::code_style::CodeStyleScorer;
use scorer::scorers::coverage::CoverageScorer;
use scorer::scorers::unit_test::UnitTestScorer;
use scorer::style::command_checker::CommandStyleChecker;
use scorer::style::line_rules::LineRules;
use scorer::traits::scorer::Scorer;
use scorer::utilities::command::CommandSpec;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use util::config;
use util::execution_config::{ExecutionLimits, ProjectSetup};
use util::languages::Language;

#[derive(Debug, Deserialize)]
pub struct PipelineFile {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub project: ProjectSetup,
    #[serde(default)]
    pub execution: Option<ExecutionLimits>,
    /// Where the coverage scorers write their JSON report.
    #[serde(default)]
    pub artifact: Option<PathBuf>,
    pub scorers: Vec<ScorerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorerEntry {
    UnitTest {
        weight: f64,
        runner: CommandSpec,
        /// Fully-qualified test names; discovered from `root` when absent.
        #[serde(default)]
        names: Option<Vec<String>>,
        #[serde(default)]
        pattern: Option<String>,
    },
    CodeStyle {
        weight: f64,
        /// Files under `root` that are not checked.
        #[serde(default)]
        ignore: Vec<String>,
        #[serde(default)]
        ignore_codes: Vec<String>,
        /// External checker; defaults to `pycodestyle` for Python.
        #[serde(default)]
        checker: Option<CommandSpec>,
        /// Use the built-in line rules instead of an external checker.
        #[serde(default)]
        line_rules: bool,
        #[serde(default)]
        max_line_length: Option<usize>,
    },
    Coverage {
        weight: f64,
        runner: CommandSpec,
        #[serde(default)]
        pattern: Option<String>,
        files: Vec<PathBuf>,
        #[serde(default)]
        reset: Option<CommandSpec>,
        #[serde(default)]
        report: Option<CommandSpec>,
        data: PathBuf,
        format: CoverageFormat,
    },
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn in_root(mut command: CommandSpec, root: &Path) -> CommandSpec {
    if command.workdir.is_none() {
        command.workdir = Some(root.to_path_buf());
    }
    command
}

/// Checker a `code_style` entry runs.
#[derive(Debug)]
enum StyleBackend {
    External(CommandSpec),
    Lines(LineRules),
}

fn style_backend(
    language: Language,
    checker: Option<CommandSpec>,
    line_rules: bool,
    ignore_codes: Vec<String>,
    max_line_length: Option<usize>,
    limits: &ExecutionLimits,
) -> Result<StyleBackend, GradingError> {
    if max_line_length == Some(0) {
        return Err(GradingError::InvalidConfig(
            "code_style: max_line_length must be positive".into(),
        ));
    }
    match (checker, line_rules) {
        (Some(_), true) => Err(GradingError::InvalidConfig(
            "code_style: give either `checker` or `line_rules`, not both".into(),
        )),
        (Some(command), false) => {
            if max_line_length.is_some() || !ignore_codes.is_empty() {
                debug!("code_style: line rule options are ignored by an external checker");
            }
            Ok(StyleBackend::External(command))
        }
        (None, false) if language == Language::Python => {
            let mut command = CommandStyleChecker::pycodestyle().command;
            if !ignore_codes.is_empty() {
                command = command.arg(format!("--ignore={}", ignore_codes.join(",")));
            }
            if let Some(max) = max_line_length {
                command = command.arg(format!("--max-line-length={max}"));
            }
            Ok(StyleBackend::External(command))
        }
        (None, _) => {
            let mut rules = LineRules::new().ignoring(ignore_codes);
            rules.max_file_size = limits.max_source_bytes;
            if let Some(max) = max_line_length {
                rules = rules.with_max_line_length(max);
            }
            Ok(StyleBackend::Lines(rules))
        }
    }
}

impl ScorerEntry {
    pub fn weight(&self) -> f64 {
        match self {
            ScorerEntry::UnitTest { weight, .. }
            | ScorerEntry::CodeStyle { weight, .. }
            | ScorerEntry::Coverage { weight, .. } => *weight,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ScorerEntry::UnitTest { .. } => "unit_test",
            ScorerEntry::CodeStyle { .. } => "code_style",
            ScorerEntry::Coverage { .. } => "coverage",
        }
    }

    fn build(
        self,
        root: &Path,
        language: Language,
        limits: &ExecutionLimits,
        artifact: Option<&Path>,
    ) -> Result<Box<dyn Scorer>, GradingError> {
        match self {
            ScorerEntry::UnitTest {
                runner,
                names,
                pattern,
                ..
            } => match (names, pattern) {
                (Some(_), Some(_)) => Err(GradingError::InvalidConfig(
                    "unit_test: give either `names` or `pattern`, not both".into(),
                )),
                (Some(names), None) => Ok(Box::new(UnitTestScorer::from_names(
                    in_root(runner, root),
                    names,
                ))),
                (None, pattern) => Ok(Box::new(UnitTestScorer::from_handin_dir(
                    root, language, pattern, runner,
                ))),
            },
            ScorerEntry::CodeStyle {
                ignore,
                ignore_codes,
                checker,
                line_rules,
                max_line_length,
                ..
            } => match style_backend(
                language,
                checker,
                line_rules,
                ignore_codes,
                max_line_length,
                limits,
            )? {
                StyleBackend::External(command) => Ok(Box::new(CodeStyleScorer::from_handin_dir(
                    root,
                    language,
                    CommandStyleChecker::new(in_root(command, root)),
                    ignore,
                ))),
                StyleBackend::Lines(rules) => Ok(Box::new(CodeStyleScorer::from_handin_dir(
                    root, language, rules, ignore,
                ))),
            },
            ScorerEntry::Coverage {
                runner,
                pattern,
                files,
                reset,
                report,
                data,
                format,
                ..
            } => {
                if files.is_empty() {
                    return Err(GradingError::InvalidConfig(
                        "coverage: `files` names no file to measure".into(),
                    ));
                }
                let data = if data.is_relative() {
                    root.join(data)
                } else {
                    data
                };
                let mut collector = CommandCollector::new(data, format);
                if let Some(reset) = reset {
                    collector = collector.with_reset(in_root(reset, root));
                }
                if let Some(report) = report {
                    collector = collector.with_report(in_root(report, root));
                }
                let mut scorer =
                    CoverageScorer::from_handin_dir(root, language, pattern, runner, files, collector)
                        .with_max_source_bytes(limits.max_source_bytes);
                if let Some(path) = artifact {
                    scorer = scorer.with_artifact(path);
                }
                Ok(Box::new(scorer))
            }
        }
    }
}

impl PipelineFile {
    /// Read and parse a pipeline file, resolving a relative `root` against its directory.
    pub fn load(path: &Path) -> Result<Self, GradingError> {
        let content = fs::read_to_string(path).map_err(|e| {
            GradingError::Io(format!("Failed to read pipeline file {}: {}", path.display(), e))
        })?;
        let mut file = Self::parse(&content).map_err(|e| match e {
            GradingError::InvalidConfig(msg) => {
                GradingError::InvalidConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        if file.root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            file.root = base.join(&file.root);
        }
        Ok(file)
    }

    pub fn parse(content: &str) -> Result<Self, GradingError> {
        serde_json::from_str(content)
            .map_err(|e| GradingError::InvalidConfig(format!("invalid pipeline JSON: {e}")))
    }

    /// Limits from the file, or the environment's scorer timeout when the file has none.
    pub fn limits(&self) -> ExecutionLimits {
        self.execution.clone().unwrap_or_else(|| ExecutionLimits {
            timeout_secs: config::scorer_timeout_secs(),
            ..ExecutionLimits::default()
        })
    }

    pub fn artifact_path(&self) -> Option<PathBuf> {
        match &self.artifact {
            Some(path) => Some(path.clone()),
            None => {
                let configured = config::coverage_artifact();
                (!configured.trim().is_empty()).then(|| PathBuf::from(configured))
            }
        }
    }

    /// Build the scorers in file order.
    ///
    /// # Errors
    /// [`GradingError::InvalidConfig`] for an entry that cannot describe a working scorer.
    /// Weights are checked when the pipeline runs.
    pub fn into_pipeline(self) -> Result<Pipeline, GradingError> {
        let limits = self.limits();
        let artifact = self.artifact_path();
        let language = self.project.language;

        let mut pipeline = Pipeline::new();
        if let Some(limit) = limits.time_limit() {
            pipeline = pipeline.with_time_limit(limit);
        }
        for (index, entry) in self.scorers.into_iter().enumerate() {
            let weight = entry.weight();
            debug!("Entry #{}: {} (weight {})", index + 1, entry.kind(), weight);
            let scorer = entry
                .build(&self.root, language, &limits, artifact.as_deref())
                .map_err(|e| match e {
                    GradingError::InvalidConfig(msg) => {
                        GradingError::InvalidConfig(format!("scorer #{}: {}", index + 1, msg))
                    }
                    other => other,
                })?;
            pipeline = pipeline.push(WeightedScorer::boxed(scorer, weight));
        }
        Ok(pipeline)
    }
}
