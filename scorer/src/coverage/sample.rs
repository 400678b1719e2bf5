//! Per-file coverage samples.
//!
//! A [`CoverageSample`] is what an instrumented run recorded for one file: which lines are
//! executable statements, which of those never ran, and for each branching line how many of
//! its exits exist and how many were taken.

use crate::error::ParseError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use util::paths::normalize;

/// Exit statistics of one branching line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchStat {
    pub total_exits: u32,
    pub taken_exits: u32,
}

/// How thoroughly a branching line was exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// Every exit was taken.
    Taken,
    /// No exit was taken.
    NotTaken,
    /// Some, but not all, exits were taken.
    Partial,
}

impl BranchStat {
    pub fn new(total_exits: u32, taken_exits: u32) -> Self {
        Self {
            total_exits,
            taken_exits,
        }
    }

    pub fn kind(&self) -> BranchKind {
        if self.taken_exits == self.total_exits {
            BranchKind::Taken
        } else if self.taken_exits == 0 {
            BranchKind::NotTaken
        } else {
            BranchKind::Partial
        }
    }
}

/// Coverage recorded for one file.
///
/// Invariants: `missed_lines ⊆ exec_lines` and `taken_exits <= total_exits` for every branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageSample {
    exec_lines: BTreeSet<u32>,
    missed_lines: BTreeSet<u32>,
    branch_stats: BTreeMap<u32, BranchStat>,
}

impl CoverageSample {
    pub fn new(
        exec_lines: BTreeSet<u32>,
        missed_lines: BTreeSet<u32>,
        branch_stats: BTreeMap<u32, BranchStat>,
    ) -> Result<Self, ParseError> {
        if let Some(line) = missed_lines.difference(&exec_lines).next() {
            return Err(ParseError::InvalidValue(format!(
                "line {line} is reported missed but is not an executable statement"
            )));
        }
        if let Some((line, stat)) = branch_stats
            .iter()
            .find(|(_, s)| s.taken_exits > s.total_exits)
        {
            return Err(ParseError::InvalidValue(format!(
                "line {line} reports {} taken exits out of {}",
                stat.taken_exits, stat.total_exits
            )));
        }
        Ok(Self {
            exec_lines,
            missed_lines,
            branch_stats,
        })
    }

    pub fn exec_lines(&self) -> &BTreeSet<u32> {
        &self.exec_lines
    }

    pub fn missed_lines(&self) -> &BTreeSet<u32> {
        &self.missed_lines
    }

    pub fn branch_stats(&self) -> &BTreeMap<u32, BranchStat> {
        &self.branch_stats
    }

    pub fn branch(&self, line: u32) -> Option<BranchStat> {
        self.branch_stats.get(&line).copied()
    }
}

/// Samples for every file an instrumented run touched, keyed by normalised path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageData {
    files: BTreeMap<PathBuf, CoverageSample>,
}

impl CoverageData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &Path, sample: CoverageSample) {
        self.files.insert(normalize(path), sample);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(|p| p.as_path())
    }

    /// Find the sample for `target`.
    ///
    /// Tools may report absolute paths while targets are relative to the submission root (or
    /// the other way round), so when there is no exact match a unique suffix match is accepted.
    pub fn lookup(&self, target: &Path) -> Option<&CoverageSample> {
        let wanted = normalize(target);
        if let Some(sample) = self.files.get(&wanted) {
            return Some(sample);
        }

        let mut candidates = self
            .files
            .iter()
            .filter(|(path, _)| path.ends_with(&wanted) || wanted.ends_with(path));
        match (candidates.next(), candidates.next()) {
            (Some((_, sample)), None) => Some(sample),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[u32]) -> BTreeSet<u32> {
        v.iter().copied().collect()
    }

    #[test]
    fn test_branch_classification() {
        assert_eq!(BranchStat::new(2, 2).kind(), BranchKind::Taken);
        assert_eq!(BranchStat::new(2, 0).kind(), BranchKind::NotTaken);
        assert_eq!(BranchStat::new(3, 1).kind(), BranchKind::Partial);
        // a line without exits counts as fully taken
        assert_eq!(BranchStat::new(0, 0).kind(), BranchKind::Taken);
    }

    #[test]
    fn test_rejects_missed_outside_exec() {
        let err = CoverageSample::new(lines(&[1, 2]), lines(&[3]), BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue(msg) if msg.contains("line 3")));
    }

    #[test]
    fn test_rejects_taken_above_total() {
        let mut branches = BTreeMap::new();
        branches.insert(4, BranchStat::new(2, 3));
        assert!(CoverageSample::new(lines(&[4]), lines(&[]), branches).is_err());
    }

    #[test]
    fn test_lookup_exact_and_suffix() {
        let mut data = CoverageData::new();
        data.insert(Path::new("/work/handin/myfunc.py"), CoverageSample::default());
        data.insert(Path::new("./pkg/util.py"), CoverageSample::default());

        assert!(data.lookup(Path::new("pkg/util.py")).is_some());
        assert!(data.lookup(Path::new("myfunc.py")).is_some());
        assert!(data.lookup(Path::new("other.py")).is_none());
    }

    #[test]
    fn test_lookup_ambiguous_suffix_is_none() {
        let mut data = CoverageData::new();
        data.insert(Path::new("a/util.py"), CoverageSample::default());
        data.insert(Path::new("b/util.py"), CoverageSample::default());
        assert!(data.lookup(Path::new("util.py")).is_none());
    }
}
