//! Coverage Analyzer
//!
//! Turns per-file [`CoverageSample`]s into statement and branch statistics, the composite
//! coverage score, and the annotated source listings shown to students.
//!
//! # Statistics
//!
//! For every target file the analyzer counts executable statements, missed statements, and
//! classifies each branching line as fully taken, not taken, or partially taken. Counts are
//! summed over all targets and turned into three percentages:
//!
//! - `stmt_cover = 100 - 100 * miss / exec`
//! - `branch_cover = 100 * taken / branches`
//! - `branch_partial = 100 * partial / branches`
//!
//! Division by zero yields `0.0`, so a target set without statements reports 100% statement
//! coverage and one without branches reports 0% branch coverage.
//!
//! # Listings
//!
//! Each source line is prefixed with a marker and a space:
//!
//! | listing   | `+`          | `-`       | `*`     | blank            |
//! |-----------|--------------|-----------|---------|------------------|
//! | statement | executed     | missed    |         | not executable   |
//! | branch    | fully taken  | not taken | partial | no branch        |

use crate::coverage::sample::{BranchKind, CoverageSample};
use std::path::{Path, PathBuf};
use util::code_coverage_report::{CoverageFile, CoverageSummary};

pub const STATEMENT_WEIGHT: f64 = 0.5;
pub const BRANCH_WEIGHT: f64 = 0.5;
/// Partial branches earn a quarter on top of the statement and branch halves. The result is not
/// clamped.
pub const PARTIAL_WEIGHT: f64 = 0.25;

/// `a / b`, or `0.0` when `b` is zero.
pub fn safe_divide(a: usize, b: usize) -> f64 {
    if b > 0 { a as f64 / b as f64 } else { 0.0 }
}

/// Counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    pub exec: usize,
    pub miss: usize,
    pub branches: usize,
    pub taken: usize,
    pub partial: usize,
    pub notaken: usize,
}

impl FileStats {
    pub fn from_sample(sample: &CoverageSample) -> Self {
        let mut stats = FileStats {
            exec: sample.exec_lines().len(),
            miss: sample.missed_lines().len(),
            branches: sample.branch_stats().len(),
            ..FileStats::default()
        };
        for stat in sample.branch_stats().values() {
            match stat.kind() {
                BranchKind::Taken => stats.taken += 1,
                BranchKind::NotTaken => stats.notaken += 1,
                BranchKind::Partial => stats.partial += 1,
            }
        }
        stats
    }
}

/// Counts accumulated over every target file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageTotals {
    pub total_exec: usize,
    pub total_miss: usize,
    pub total_branch: usize,
    pub total_taken: usize,
    pub total_partial: usize,
    pub total_notaken: usize,
}

impl CoverageTotals {
    pub fn add(&mut self, stats: &FileStats) {
        self.total_exec += stats.exec;
        self.total_miss += stats.miss;
        self.total_branch += stats.branches;
        self.total_taken += stats.taken;
        self.total_partial += stats.partial;
        self.total_notaken += stats.notaken;
    }

    pub fn stmt_cover(&self) -> f64 {
        100.0 - 100.0 * safe_divide(self.total_miss, self.total_exec)
    }

    pub fn branch_cover(&self) -> f64 {
        100.0 * safe_divide(self.total_taken, self.total_branch)
    }

    pub fn branch_partial(&self) -> f64 {
        100.0 * safe_divide(self.total_partial, self.total_branch)
    }

    /// The composite coverage score. Not clamped to 100.
    pub fn score(&self) -> f64 {
        self.stmt_cover() * STATEMENT_WEIGHT
            + self.branch_cover() * BRANCH_WEIGHT
            + self.branch_partial() * PARTIAL_WEIGHT
    }
}

/// Statistics and listings for one analysed file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCoverage {
    pub path: PathBuf,
    pub stats: FileStats,
    pub missed_lines: Vec<u32>,
    pub statement_listing: String,
    pub branch_listing: String,
}

impl FileCoverage {
    pub fn to_artifact(&self) -> CoverageFile {
        CoverageFile {
            path: util::paths::to_slash(&self.path),
            statements: self.stats.exec as u64,
            missed_statements: self.stats.miss as u64,
            branches: self.stats.branches as u64,
            taken_branches: self.stats.taken as u64,
            partial_branches: self.stats.partial as u64,
            notaken_branches: self.stats.notaken as u64,
            missed_lines: self.missed_lines.clone(),
        }
    }
}

/// Everything the coverage scorer needs from one analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageAnalysis {
    pub files: Vec<FileCoverage>,
    pub totals: CoverageTotals,
}

impl CoverageAnalysis {
    pub fn summary(&self) -> CoverageSummary {
        let t = &self.totals;
        CoverageSummary {
            total_files: self.files.len() as u64,
            total_statements: t.total_exec as u64,
            missed_statements: t.total_miss as u64,
            total_branches: t.total_branch as u64,
            taken_branches: t.total_taken as u64,
            partial_branches: t.total_partial as u64,
            notaken_branches: t.total_notaken as u64,
            statement_percent: t.stmt_cover(),
            branch_percent: t.branch_cover(),
            partial_percent: t.branch_partial(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CoverageAnalyzer {
    analysis: CoverageAnalysis,
}

impl CoverageAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyse one target file given its source text and recorded sample.
    pub fn add_file(&mut self, path: &Path, source: &str, sample: &CoverageSample) -> &FileCoverage {
        let stats = FileStats::from_sample(sample);
        self.analysis.totals.add(&stats);
        self.analysis.files.push(FileCoverage {
            path: path.to_path_buf(),
            stats,
            missed_lines: sample.missed_lines().iter().copied().collect(),
            statement_listing: annotate_statements(source, sample),
            branch_listing: annotate_branches(source, sample),
        });
        let last = self.analysis.files.len() - 1;
        &self.analysis.files[last]
    }

    pub fn finish(self) -> CoverageAnalysis {
        self.analysis
    }
}

fn annotate(source: &str, marker: impl Fn(u32) -> char) -> String {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{} {}", marker(i as u32 + 1), line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Statement listing: `+` executed, `-` missed, blank otherwise.
pub fn annotate_statements(source: &str, sample: &CoverageSample) -> String {
    annotate(source, |line| {
        if sample.missed_lines().contains(&line) {
            '-'
        } else if sample.exec_lines().contains(&line) {
            '+'
        } else {
            ' '
        }
    })
}

/// Branch listing: `+` fully taken, `-` not taken, `*` partial, blank when no branch.
pub fn annotate_branches(source: &str, sample: &CoverageSample) -> String {
    annotate(source, |line| match sample.branch(line).map(|b| b.kind()) {
        None => ' ',
        Some(BranchKind::Taken) => '+',
        Some(BranchKind::NotTaken) => '-',
        Some(BranchKind::Partial) => '*',
    })
}
