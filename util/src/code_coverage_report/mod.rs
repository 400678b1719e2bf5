//! Coverage side artifact.
//!
//! The coverage scorer exports one of these after every instrumented run. Downstream
//! consumers read it back from the configured path; it is never returned in-band.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub total_files: u64,
    pub total_statements: u64,
    pub missed_statements: u64,
    pub total_branches: u64,
    pub taken_branches: u64,
    pub partial_branches: u64,
    pub notaken_branches: u64,
    pub statement_percent: f64,
    pub branch_percent: f64,
    pub partial_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageFile {
    pub path: String,
    pub statements: u64,
    pub missed_statements: u64,
    pub branches: u64,
    pub taken_branches: u64,
    pub partial_branches: u64,
    pub notaken_branches: u64,
    /// Line numbers never executed, ascending.
    pub missed_lines: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub generated_at: String,
    pub summary: CoverageSummary,
    pub files: Vec<CoverageFile>,
}

impl CoverageReport {
    /// Stamp a report with the current time.
    pub fn new(summary: CoverageSummary, files: Vec<CoverageFile>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            summary,
            files,
        }
    }

    /// Write the report as pretty JSON, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<(), String> {
        crate::paths::ensure_parent_dir(path)
            .map_err(|e| format!("Failed to create directory for {}: {}", path.display(), e))?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize coverage report: {}", e))?;
        fs::write(path, json)
            .map_err(|e| format!("Failed to write coverage report {}: {}", path.display(), e))
    }

    pub fn read(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read coverage report {}: {}", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("Invalid coverage report: {}", e))
    }
}
