use async_trait::async_trait;
use scorer::coverage::sample::{BranchStat, CoverageData, CoverageSample};
use scorer::error::{GradingError, ScorerError};
use scorer::input::check_class::CheckClasses;
use scorer::input::schema::{FieldKind, FieldSpec, RecordSchema};
use scorer::pipeline::Pipeline;
use scorer::result::Verdict;
use scorer::scorers::code_style::CodeStyleScorer;
use scorer::scorers::coverage::CoverageScorer;
use scorer::scorers::input_class::InputClassScorer;
use scorer::scorers::unit_test::UnitTestScorer;
use scorer::style::line_rules::LineRules;
use scorer::suites::case_suite::{CaseError, CaseSuite, TestCase};
use scorer::traits::collector::CoverageCollector;
use scorer::traits::scorer::Scorer;
use scorer::traits::suite::SuiteSource;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use util::languages::Language;
use util::test_helpers::setup_handin_dir;

/// Seven passing cases, two erroring, one failing.
struct SevenOfTen;

impl TestCase for SevenOfTen {
    fn suite() -> CaseSuite {
        let mut suite = CaseSuite::new("SevenOfTen");
        for i in 0..7 {
            suite = suite.case(format!("test_pass_{i}"), || Ok(()));
        }
        suite
            .case("test_error_0", || Err(CaseError::Error("fixture".into())))
            .case("test_error_1", || panic!("index out of range"))
            .case("test_fail", || CaseError::check(false, "expected 3, got 4"))
    }
}

fn ab_schema() -> RecordSchema {
    RecordSchema::new()
        .field(FieldSpec::new("a", FieldKind::Int))
        .field(FieldSpec::new("b", FieldKind::Int))
}

fn four_classes() -> CheckClasses {
    CheckClasses::builder()
        .rule("a is negative", |r| r.int("a").is_some_and(|a| a < 0))
        .rule("a is zero", |r| r.int("a") == Some(0))
        .rule("a equals b", |r| r.int("a").is_some() && r.int("a") == r.int("b"))
        .rule("b is huge", |r| r.int("b").is_some_and(|b| b > 1_000_000))
        .build()
        .unwrap()
}

/// Five python files, one with trailing whitespace.
fn style_handin() -> tempfile::TempDir {
    setup_handin_dir(&[
        ("a.py", "x = 1\n"),
        ("b.py", "y = 2\n"),
        ("c.py", "z = 3\n"),
        ("d.py", "w = 4\n"),
        ("e.py", "v = 5 \n"),
    ])
}

/// Always reports the reference sample for `myfunc.py`.
struct ReferenceCollector;

#[async_trait]
impl CoverageCollector for ReferenceCollector {
    async fn begin(&self) -> Result<(), ScorerError> {
        Ok(())
    }

    async fn collect(&self) -> Result<CoverageData, ScorerError> {
        let exec: BTreeSet<u32> = (1..=10).collect();
        let missed: BTreeSet<u32> = [3, 6, 8].into_iter().collect();
        let branches: BTreeMap<u32, BranchStat> = [
            (1, BranchStat::new(2, 2)),
            (2, BranchStat::new(3, 3)),
            (4, BranchStat::new(2, 1)),
            (5, BranchStat::new(2, 0)),
        ]
        .into_iter()
        .collect();
        let mut data = CoverageData::new();
        data.insert(
            Path::new("myfunc.py"),
            CoverageSample::new(exec, missed, branches).unwrap(),
        );
        Ok(data)
    }
}

struct Sleepy {
    name: &'static str,
    delay: Duration,
    score: f64,
}

#[async_trait]
impl Scorer for Sleepy {
    fn name(&self) -> &str {
        self.name
    }

    async fn evaluate(&mut self) -> Result<Verdict, ScorerError> {
        tokio::time::sleep(self.delay).await;
        Ok(Verdict::new(self.score, "slept".into(), Vec::new()))
    }
}

struct Broken;

#[async_trait]
impl Scorer for Broken {
    fn name(&self) -> &str {
        "Broken Scorer"
    }

    async fn evaluate(&mut self) -> Result<Verdict, ScorerError> {
        Err(GradingError::Internal("grading logic bug".into()).into())
    }
}

#[tokio::test]
async fn test_failure_in_middle_scorer_is_isolated() {
    let style = style_handin();
    let report = Pipeline::new()
        .add(UnitTestScorer::from_test_case::<SevenOfTen>(), 1.0)
        .add(
            InputClassScorer::new(ab_schema(), "a,b\n1,not-a-number\n", four_classes()),
            1.0,
        )
        .add(
            CodeStyleScorer::from_handin_dir(
                style.path(),
                Language::Python,
                LineRules::new(),
                Vec::<String>::new(),
            ),
            2.0,
        )
        .run()
        .await
        .unwrap();

    assert_eq!(report.results.len(), 3);
    let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["Functionality Scorer", "InputClass Scorer", "CodeStyle Scorer"]
    );

    assert!((report.results[0].score - 70.0).abs() < 1e-9);
    assert_eq!(report.results[1].score, 0.0);
    assert_eq!(report.results[1].brief.template, "CSV data does not match schema.");
    assert!(report.results[1].elapsed.is_none());
    assert!((report.results[2].score - 80.0).abs() < 1e-9);

    // (70 * 1 + 0 * 1 + 80 * 2) / 4
    assert!((report.final_score - 57.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_coverage_and_input_classes_reference_scores() {
    let handin = setup_handin_dir(&[(
        "myfunc.py",
        "if a:\n  if b or c:\n    x()\n  if d:\n    while e:\n      y()\n  z()\n  w()\n  v()\nu()\n",
    )]);
    let report = Pipeline::new()
        .add(
            CoverageScorer::new(
                SuiteSource::eager(CaseSuite::new("empty")),
                vec![handin.path().join("myfunc.py")],
                ReferenceCollector,
            ),
            0.9,
        )
        .add(
            InputClassScorer::new(ab_schema(), "a,b\n-1,3\n0,0\n5,5\n", four_classes()),
            0.1,
        )
        .run()
        .await
        .unwrap();

    assert!((report.results[0].score - 66.25).abs() < 1e-9);
    assert_eq!(report.results[1].score, 75.0);
    let detail: Vec<String> = report.results[1].detail.iter().map(|m| m.render()).collect();
    assert_eq!(detail.len(), 4);
    assert!(detail[3].starts_with("NOT COVERED: "));
    assert!((report.final_score - (66.25 * 0.9 + 75.0 * 0.1)).abs() < 1e-9);
}

#[tokio::test]
async fn test_results_follow_input_order_not_duration() {
    let report = Pipeline::new()
        .add(
            Sleepy {
                name: "slow",
                delay: Duration::from_millis(60),
                score: 10.0,
            },
            1.0,
        )
        .add(
            Sleepy {
                name: "fast",
                delay: Duration::ZERO,
                score: 20.0,
            },
            1.0,
        )
        .run()
        .await
        .unwrap();
    let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["slow", "fast"]);
    assert!((report.final_score - 15.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_time_limit_fails_only_the_slow_scorer() {
    let report = Pipeline::new()
        .with_time_limit(Duration::from_millis(50))
        .add(
            Sleepy {
                name: "stuck",
                delay: Duration::from_secs(3600),
                score: 100.0,
            },
            1.0,
        )
        .add(UnitTestScorer::from_test_case::<SevenOfTen>(), 1.0)
        .run()
        .await
        .unwrap();
    assert_eq!(report.results[0].score, 0.0);
    assert!(report.results[0]
        .brief
        .render()
        .starts_with("did not complete within the time limit"));
    assert!((report.results[1].score - 70.0).abs() < 1e-9);
    assert!((report.final_score - 35.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_defect_aborts_the_pass() {
    let result = Pipeline::new()
        .add(UnitTestScorer::from_test_case::<SevenOfTen>(), 1.0)
        .add(Broken, 1.0)
        .run()
        .await;
    assert!(matches!(result, Err(GradingError::Internal(_))));
}

#[tokio::test]
async fn test_lazy_scorer_is_built_when_run() {
    let style = style_handin();
    let root: PathBuf = style.path().to_path_buf();
    let report = Pipeline::new()
        .add_lazy(
            move || {
                Ok(Box::new(CodeStyleScorer::from_handin_dir(
                    root,
                    Language::Python,
                    LineRules::new(),
                    ["e.py"],
                )) as Box<dyn Scorer>)
            },
            1.0,
        )
        .run()
        .await
        .unwrap();
    assert_eq!(report.results[0].score, 100.0);
    assert_eq!(
        report.results[0].brief.render(),
        "All files passed the code style check"
    );
}

#[tokio::test]
async fn test_report_json_shape() {
    let report = Pipeline::new()
        .add(UnitTestScorer::from_test_case::<SevenOfTen>(), 1.0)
        .run()
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    let entry = &json["results"][0];
    assert_eq!(entry["name"], "Functionality Scorer");
    assert_eq!(
        entry["brief"]["template"],
        "{rate}% tests ({success} of {total}) passed."
    );
    assert_eq!(entry["brief"]["params"]["success"], 7);
    assert_eq!(entry["detail"].as_array().unwrap().len(), 10);
    assert!(entry["elapsed"].is_f64());
}
