//! gcov Report Parser
//!
//! Parses one `.gcov` file written by `gcov -b` (optionally with `-c`) into the source path it
//! describes and a [`CoverageSample`].
//!
//! # Format
//!
//! ```text
//!         -:    0:Source:myfunc.c
//!         3:    4:    if (x > 0) {
//! branch  0 taken 2
//! branch  1 taken 1
//!     #####:    5:        return -1;
//!         -:    6:    }
//! ```
//!
//! - A count of `-` marks a line that is not executable.
//! - `#####` and `=====` mark executable lines that never ran; any other count ran.
//! - A trailing `*` on a count (unexecuted blocks on the line) is ignored.
//! - `branch N taken X` / `branch N never executed` lines belong to the preceding source line.
//!   `X` may be a count or a percentage; anything above zero counts as taken.
//!
//! Lines repeated by template instantiation blocks are merged: a line ran if any instance ran.

use crate::coverage::sample::{BranchStat, CoverageSample};
use crate::error::ParseError;
use crate::traits::parser::Parser;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::LazyLock;

static LINE_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^:\s]+):\s*(\d+):(.*)$").expect("valid gcov line pattern")
});

static BRANCH_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*branch\s+\d+\s+(?:taken\s+([\d.]+)([%kKMG]?)|never executed)")
        .expect("valid gcov branch pattern")
});

pub struct GcovParser;

fn count_ran(count: &str) -> Result<bool, ParseError> {
    let count = count.trim_end_matches('*');
    if count.chars().all(|c| c == '#' || c == '=' || c == '%') {
        return Ok(false);
    }
    // `gcov -h` abbreviates large counts (1.2k); only zero versus non-zero matters here
    let digits = count.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    digits
        .parse::<f64>()
        .map(|n| n > 0.0)
        .map_err(|_| ParseError::InvalidValue(format!("unrecognised execution count '{count}'")))
}

impl Parser<&str, (PathBuf, CoverageSample)> for GcovParser {
    fn parse(&self, input: &str) -> Result<(PathBuf, CoverageSample), ParseError> {
        let mut source: Option<PathBuf> = None;
        let mut exec = BTreeSet::new();
        let mut ran = BTreeSet::new();
        let mut branches: BTreeMap<u32, BranchStat> = BTreeMap::new();
        let mut current_line: Option<u32> = None;

        for raw in input.lines() {
            if let Some(caps) = BRANCH_RECORD.captures(raw) {
                let line = current_line.ok_or_else(|| {
                    ParseError::Malformed("branch record before any source line".to_string())
                })?;
                let taken = match caps.get(1) {
                    Some(value) => value.as_str().parse::<f64>().map_err(|_| {
                        ParseError::InvalidValue(format!("bad branch count in '{raw}'"))
                    })? > 0.0,
                    None => false,
                };
                let stat = branches.entry(line).or_insert(BranchStat::new(0, 0));
                stat.total_exits += 1;
                if taken {
                    stat.taken_exits += 1;
                }
                continue;
            }

            let Some(caps) = LINE_RECORD.captures(raw) else {
                continue;
            };
            let count = &caps[1];
            let lineno: u32 = caps[2]
                .parse()
                .map_err(|_| ParseError::InvalidValue(format!("bad line number in '{raw}'")))?;
            let text = &caps[3];

            if lineno == 0 {
                if let Some(path) = text.strip_prefix("Source:") {
                    source = Some(PathBuf::from(path.trim()));
                }
                continue;
            }

            current_line = Some(lineno);
            if count == "-" {
                continue;
            }
            exec.insert(lineno);
            if count_ran(count)? {
                ran.insert(lineno);
            }
        }

        let source = source.ok_or_else(|| ParseError::MissingField("Source".to_string()))?;
        let missed = exec.difference(&ran).copied().collect();
        let sample = CoverageSample::new(exec, missed, branches)?;
        Ok((source, sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::sample::BranchKind;

    const SAMPLE: &str = "        -:    0:Source:src/myfunc.c
        -:    0:Graph:myfunc.gcno
        -:    1:#include <stdio.h>
function sign called 3 returned 100% blocks executed 80%
        3:    2:int sign(int x) {
        3:    3:    if (x > 0)
branch  0 taken 2
branch  1 taken 1
        2:    4:        return 1;
    #####:    5:    if (x < -100)
branch  0 never executed
branch  1 never executed
    =====:    6:        return -2;
       1*:    7:    return x < 0 ? -1 : 0;
branch  0 taken 1
branch  1 taken 0
        -:    8:}
";

    #[test]
    fn test_parses_lines_and_branches() {
        let (source, sample) = GcovParser.parse(SAMPLE).unwrap();
        assert_eq!(source, PathBuf::from("src/myfunc.c"));
        assert_eq!(
            sample.exec_lines().iter().copied().collect::<Vec<_>>(),
            vec![2, 3, 4, 5, 6, 7]
        );
        assert_eq!(
            sample.missed_lines().iter().copied().collect::<Vec<_>>(),
            vec![5, 6]
        );
        assert_eq!(sample.branch(3).unwrap().kind(), BranchKind::Taken);
        assert_eq!(sample.branch(5).unwrap().kind(), BranchKind::NotTaken);
        assert_eq!(sample.branch(7), Some(BranchStat::new(2, 1)));
        assert_eq!(sample.branch(4), None);
    }

    #[test]
    fn test_percentages_and_repeated_lines() {
        let input = "        -:    0:Source:t.cpp
        1:    3:  if (a)
branch  0 taken 50%
branch  1 taken 0%
    #####:    9:  f();
        2:    9:  f();
";
        let (_, sample) = GcovParser.parse(input).unwrap();
        assert_eq!(sample.branch(3), Some(BranchStat::new(2, 1)));
        assert!(sample.exec_lines().contains(&9));
        assert!(sample.missed_lines().is_empty());
    }

    #[test]
    fn test_missing_source_tag() {
        let err = GcovParser.parse("        1:    1:int x;\n").unwrap_err();
        assert_eq!(err, ParseError::MissingField("Source".to_string()));
    }

    #[test]
    fn test_branch_without_line_is_malformed() {
        let err = GcovParser
            .parse("        -:    0:Source:a.c\nbranch  0 taken 1\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }
}
