//! coverage.py JSON Report Parser
//!
//! Reads the report written by `coverage json` after a run with branch measurement enabled:
//!
//! ```json
//! {
//!   "files": {
//!     "myfunc.py": {
//!       "executed_lines": [1, 2, 4],
//!       "missing_lines": [5],
//!       "executed_branches": [[2, 4]],
//!       "missing_branches": [[2, 5]]
//!     }
//!   }
//! }
//! ```
//!
//! Branches are arcs `[from, to]` (`to` is negative for exits from the code object). Arcs are
//! grouped by their `from` line: every arc is an exit, executed arcs are the taken exits.
//! Other keys (`meta`, `totals`, `summary`) are ignored.

use crate::coverage::sample::{BranchStat, CoverageData, CoverageSample};
use crate::error::ParseError;
use crate::traits::parser::Parser;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CoveragePyReport {
    files: BTreeMap<String, CoveragePyFile>,
}

#[derive(Debug, Deserialize)]
struct CoveragePyFile {
    executed_lines: Vec<u32>,
    missing_lines: Vec<u32>,
    #[serde(default)]
    executed_branches: Vec<(i64, i64)>,
    #[serde(default)]
    missing_branches: Vec<(i64, i64)>,
}

pub struct CoveragePyJsonParser;

fn from_line(arc: &(i64, i64), file: &str) -> Result<u32, ParseError> {
    u32::try_from(arc.0).map_err(|_| {
        ParseError::InvalidValue(format!(
            "{file}: branch arc [{}, {}] starts at an invalid line",
            arc.0, arc.1
        ))
    })
}

impl CoveragePyFile {
    fn into_sample(self, name: &str) -> Result<CoverageSample, ParseError> {
        let missed: BTreeSet<u32> = self.missing_lines.into_iter().collect();
        let mut exec: BTreeSet<u32> = self.executed_lines.into_iter().collect();
        exec.extend(missed.iter().copied());

        let mut branches: BTreeMap<u32, BranchStat> = BTreeMap::new();
        for arc in &self.executed_branches {
            let stat = branches
                .entry(from_line(arc, name)?)
                .or_insert(BranchStat::new(0, 0));
            stat.total_exits += 1;
            stat.taken_exits += 1;
        }
        for arc in &self.missing_branches {
            branches
                .entry(from_line(arc, name)?)
                .or_insert(BranchStat::new(0, 0))
                .total_exits += 1;
        }

        CoverageSample::new(exec, missed, branches)
    }
}

impl Parser<&str, CoverageData> for CoveragePyJsonParser {
    fn parse(&self, input: &str) -> Result<CoverageData, ParseError> {
        let report: CoveragePyReport = serde_json::from_str(input)
            .map_err(|e| ParseError::Malformed(format!("coverage JSON: {e}")))?;

        let mut data = CoverageData::new();
        for (name, file) in report.files {
            let sample = file.into_sample(&name)?;
            data.insert(Path::new(&name), sample);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::sample::BranchKind;

    #[test]
    fn test_parses_report() {
        let json = r#"{
            "meta": {"version": "7.4.0", "branch_coverage": true},
            "files": {
                "pkg/myfunc.py": {
                    "executed_lines": [1, 2, 3, 6],
                    "missing_lines": [4],
                    "excluded_lines": [],
                    "executed_branches": [[2, 3], [3, 6], [6, -1]],
                    "missing_branches": [[2, 4], [6, 1]],
                    "summary": {"covered_lines": 4}
                }
            },
            "totals": {"covered_lines": 4}
        }"#;
        let data = CoveragePyJsonParser.parse(json).unwrap();
        let sample = data.lookup(Path::new("pkg/myfunc.py")).unwrap();
        assert_eq!(sample.exec_lines().len(), 5);
        assert_eq!(
            sample.missed_lines().iter().copied().collect::<Vec<_>>(),
            vec![4]
        );
        assert_eq!(sample.branch(2), Some(BranchStat::new(2, 1)));
        assert_eq!(sample.branch(3).unwrap().kind(), BranchKind::Taken);
        assert_eq!(sample.branch(6).unwrap().kind(), BranchKind::Partial);
    }

    #[test]
    fn test_report_without_branches() {
        let json = r#"{"files": {"a.py": {"executed_lines": [1], "missing_lines": []}}}"#;
        let data = CoveragePyJsonParser.parse(json).unwrap();
        assert!(data.lookup(Path::new("a.py")).unwrap().branch_stats().is_empty());
    }

    #[test]
    fn test_malformed_report() {
        assert!(matches!(
            CoveragePyJsonParser.parse(r#"{"totals": {}}"#),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_negative_from_line_rejected() {
        let json = r#"{"files": {"a.py": {"executed_lines": [1], "missing_lines": [],
            "executed_branches": [[-1, 1]]}}}"#;
        assert!(matches!(
            CoveragePyJsonParser.parse(json),
            Err(ParseError::InvalidValue(_))
        ));
    }
}
