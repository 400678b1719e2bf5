//! Coverage scoring.
//!
//! Runs the test suite inside an [`InstrumentationSession`] and scores how thoroughly it
//! exercised the target files:
//!
//! ```text
//! score = stmt_cover * 0.5 + branch_cover * 0.5 + branch_partial * 0.25
//! ```
//!
//! The suite's own pass/fail outcomes do not matter here. Each target contributes two detail
//! blocks (statement listing, branch listing), and a JSON coverage report is written to the
//! artifact path when one is configured.

use crate::coverage::analyzer::CoverageAnalyzer;
use crate::coverage::session::InstrumentationSession;
use crate::error::{GradingError, ScorerError};
use crate::message::Message;
use crate::result::{ScorerFailure, Verdict};
use crate::suites::command_suite::CommandSuite;
use crate::traits::collector::CoverageCollector;
use crate::traits::scorer::Scorer;
use crate::traits::suite::{SuiteSource, TestSuite};
use crate::utilities::command::CommandSpec;
use crate::utilities::file_loader::{MAX_SOURCE_SIZE, read_text};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use util::code_coverage_report::CoverageReport;
use util::languages::Language;
use util::paths::to_slash;

const SEPARATOR_WIDTH: usize = 70;

pub struct CoverageScorer {
    suite: SuiteSource,
    files: Vec<PathBuf>,
    root: Option<PathBuf>,
    collector: Box<dyn CoverageCollector>,
    artifact: Option<PathBuf>,
    max_source_bytes: u64,
}

impl CoverageScorer {
    /// Measure how well `suite` covers `files`.
    pub fn new<C: CoverageCollector + 'static>(
        suite: SuiteSource,
        files: Vec<PathBuf>,
        collector: C,
    ) -> Self {
        Self {
            suite,
            files,
            root: None,
            collector: Box::new(collector),
            artifact: None,
            max_source_bytes: MAX_SOURCE_SIZE,
        }
    }

    /// Discover the test modules under `root` at evaluation time and measure the coverage of
    /// `files`, given relative to `root`.
    pub fn from_handin_dir<C: CoverageCollector + 'static>(
        root: impl Into<PathBuf>,
        language: Language,
        pattern: Option<String>,
        runner: CommandSpec,
        files: Vec<PathBuf>,
        collector: C,
    ) -> Self {
        let root = root.into();
        let discover_root = root.clone();
        let suite = SuiteSource::deferred(move || {
            let suite =
                CommandSuite::discover(&discover_root, language, pattern.as_deref(), runner)?;
            Ok(Box::new(suite) as Box<dyn TestSuite>)
        });
        let mut scorer = Self::new(suite, files, collector);
        scorer.root = Some(root);
        scorer
    }

    /// Write the JSON coverage report to `path` after each evaluation.
    pub fn with_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact = Some(path.into());
        self
    }

    pub fn with_max_source_bytes(mut self, max: u64) -> Self {
        self.max_source_bytes = max;
        self
    }

    fn target_path(&self, target: &Path) -> PathBuf {
        match &self.root {
            Some(root) if target.is_relative() => root.join(target),
            _ => target.to_path_buf(),
        }
    }
}

fn statement_block(file: &str, miss: usize, listing: &str) -> Message {
    Message::new("{file}: {miss} statement(s) not covered.\n{separator}\n{listing}")
        .with("file", file)
        .with("miss", miss)
        .with("separator", "-".repeat(SEPARATOR_WIDTH))
        .with("listing", listing)
}

fn branch_block(file: &str, partial: usize, notaken: usize, listing: &str) -> Message {
    Message::new(
        "{file}: {partial} branch(es) partially taken and {notaken} branch(es) not taken.\n{separator}\n{listing}",
    )
    .with("file", file)
    .with("partial", partial)
    .with("notaken", notaken)
    .with("separator", "-".repeat(SEPARATOR_WIDTH))
    .with("listing", listing)
}

#[async_trait]
impl Scorer for CoverageScorer {
    fn name(&self) -> &str {
        "Coverage Scorer"
    }

    async fn evaluate(&mut self) -> Result<Verdict, ScorerError> {
        let suite = self.suite.resolve()?;

        let session = InstrumentationSession::acquire(self.collector.as_ref()).await?;
        let report = suite.run().await;
        let data = session.finish().await?;
        debug!(
            "Instrumented run: {} tests, {} errors, {} failures; data for {} file(s)",
            report.outcomes.len(),
            report.errors(),
            report.failures(),
            data.len()
        );

        let mut analyzer = CoverageAnalyzer::new();
        let mut detail = Vec::with_capacity(self.files.len() * 2);
        for target in &self.files {
            let path = self.target_path(target);
            let shown = to_slash(target);
            let sample = data
                .lookup(&path)
                .or_else(|| data.lookup(target))
                .ok_or_else(|| {
                    ScorerFailure::new(
                        Message::new("No coverage data recorded for {file}")
                            .with("file", shown.as_str()),
                    )
                })?;
            let source = read_text(&path, self.max_source_bytes)?;

            let file = analyzer.add_file(Path::new(&shown), &source, sample);
            detail.push(statement_block(&shown, file.stats.miss, &file.statement_listing));
            detail.push(branch_block(
                &shown,
                file.stats.partial,
                file.stats.notaken,
                &file.branch_listing,
            ));
        }

        let analysis = analyzer.finish();
        let totals = &analysis.totals;
        let score = totals.score();
        info!(
            "Coverage: {:.2}% statements, {:.2}% branches taken, {:.2}% partial",
            totals.stmt_cover(),
            totals.branch_cover(),
            totals.branch_partial()
        );

        if let Some(artifact) = &self.artifact {
            let files = analysis.files.iter().map(|f| f.to_artifact()).collect();
            CoverageReport::new(analysis.summary(), files)
                .write(artifact)
                .map_err(GradingError::Io)?;
            debug!("Coverage report written to {}", artifact.display());
        }

        let brief = Message::new(
            "{stmt}% statements covered, {branch}% branches taken and {partial}% partially taken.",
        )
        .with("stmt", totals.stmt_cover())
        .with("branch", totals.branch_cover())
        .with("partial", totals.branch_partial());

        Ok(Verdict::new(score, brief, detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::sample::{BranchStat, CoverageData, CoverageSample};
    use crate::traits::suite::SuiteReport;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use util::test_helpers::setup_handin_dir;

    struct NoopSuite(Arc<AtomicBool>);

    #[async_trait]
    impl TestSuite for NoopSuite {
        fn count_test_cases(&self) -> usize {
            1
        }

        async fn run(&self) -> SuiteReport {
            self.0.store(true, Ordering::SeqCst);
            SuiteReport::default()
        }
    }

    /// Returns a fixed sample for `myfunc.py`.
    struct FixedCollector(CoverageData);

    #[async_trait]
    impl CoverageCollector for FixedCollector {
        async fn begin(&self) -> Result<(), ScorerError> {
            Ok(())
        }

        async fn collect(&self) -> Result<CoverageData, ScorerError> {
            Ok(self.0.clone())
        }
    }

    fn reference_data() -> CoverageData {
        let exec: BTreeSet<u32> = (1..=10).collect();
        let missed: BTreeSet<u32> = [4, 7, 9].into_iter().collect();
        let branches: BTreeMap<u32, BranchStat> = [
            (2, BranchStat::new(2, 2)),
            (3, BranchStat::new(2, 2)),
            (5, BranchStat::new(2, 1)),
            (6, BranchStat::new(2, 0)),
        ]
        .into_iter()
        .collect();
        let mut data = CoverageData::new();
        data.insert(
            Path::new("myfunc.py"),
            CoverageSample::new(exec, missed, branches).unwrap(),
        );
        data
    }

    fn source() -> String {
        (1..=12).map(|i| format!("line{i}\n")).collect()
    }

    #[tokio::test]
    async fn test_reference_score_listings_and_artifact() {
        let dir = setup_handin_dir(&[("myfunc.py", source().as_str())]);
        let ran = Arc::new(AtomicBool::new(false));
        let artifact = dir.path().join("out/coverage.json");

        let mut scorer = CoverageScorer::new(
            SuiteSource::eager(NoopSuite(ran.clone())),
            vec![dir.path().join("myfunc.py")],
            FixedCollector(reference_data()),
        )
        .with_artifact(&artifact);
        let verdict = scorer.evaluate().await.unwrap();

        assert!(ran.load(Ordering::SeqCst));
        assert!((verdict.score - 66.25).abs() < 1e-9);
        assert_eq!(
            verdict.brief.render(),
            "70.00% statements covered, 50.00% branches taken and 25.00% partially taken."
        );
        assert_eq!(verdict.detail.len(), 2);

        let statements = verdict.detail[0].render();
        assert!(statements.contains(": 3 statement(s) not covered.\n"));
        assert!(statements.contains(&"-".repeat(70)));
        assert!(statements.contains("- line4\n"));
        assert!(statements.contains("+ line1\n"));
        assert!(statements.ends_with("  line12"));

        let branches = verdict.detail[1].render();
        assert!(branches.contains(": 1 branch(es) partially taken and 1 branch(es) not taken."));
        assert!(branches.contains("* line5\n"));
        assert!(branches.contains("- line6\n"));
        assert!(branches.contains("+ line2\n"));

        let report = CoverageReport::read(&artifact).unwrap();
        assert_eq!(report.summary.total_statements, 10);
        assert_eq!(report.summary.partial_branches, 1);
        assert_eq!(report.files[0].missed_lines, vec![4, 7, 9]);
    }

    #[tokio::test]
    async fn test_target_without_data_is_failure() {
        let dir = setup_handin_dir(&[("other.py", "x = 1\n")]);
        let mut scorer = CoverageScorer::new(
            SuiteSource::eager(NoopSuite(Arc::default())),
            vec![dir.path().join("other.py")],
            FixedCollector(reference_data()),
        );
        match scorer.evaluate().await {
            Err(ScorerError::Failure(f)) => {
                assert_eq!(f.brief.template, "No coverage data recorded for {file}")
            }
            Err(other) => panic!("expected failure, got {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_unwritable_artifact_is_defect() {
        let dir = setup_handin_dir(&[("myfunc.py", source().as_str())]);
        // a regular file where the artifact's parent directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut scorer = CoverageScorer::new(
            SuiteSource::eager(NoopSuite(Arc::default())),
            vec![dir.path().join("myfunc.py")],
            FixedCollector(reference_data()),
        )
        .with_artifact(blocker.join("coverage.json"));
        assert!(matches!(
            scorer.evaluate().await,
            Err(ScorerError::Defect(GradingError::Io(_)))
        ));
    }

    #[tokio::test]
    async fn test_from_handin_dir_resolves_relative_targets() {
        let dir = setup_handin_dir(&[("myfunc.py", source().as_str())]);
        // no test modules are found, coverage is still collected and scored
        let mut scorer = CoverageScorer::from_handin_dir(
            dir.path(),
            Language::Python,
            None,
            CommandSpec::new("definitely-not-a-real-program-4711"),
            vec![PathBuf::from("myfunc.py")],
            FixedCollector(reference_data()),
        );
        let verdict = scorer.evaluate().await.unwrap();
        assert!((verdict.score - 66.25).abs() < 1e-9);
        assert!(verdict.detail[0].render().starts_with("myfunc.py: 3 statement(s)"));
    }
}
