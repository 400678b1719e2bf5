//!
//! File Loader Utility
//!
//! Reads submission files (sources to annotate, CSV input data) with the checks a grader needs
//! before trusting them: the path exists, is a regular file, and is not larger than the
//! configured limit.
//!
//! # Error Handling
//!
//! Problems with submission files are the submission's fault, so every error is a
//! [`ScorerFailure`] with a short brief and the specific cause as detail. The specific cause is
//! also logged.
//!

use crate::message::Message;
use crate::result::ScorerFailure;
use std::fs;
use std::path::Path;
use tracing::error;

/// Default maximum size for files read by scorers.
pub const MAX_SOURCE_SIZE: u64 = 2 * 1024 * 1024; // 2MB

fn failure(brief: &str, path: &Path, specific: String) -> ScorerFailure {
    error!("{}", specific);
    ScorerFailure::new(Message::new(brief).with("file", path.display().to_string()))
        .with_detail(Message::new("{reason}").with("reason", specific))
}

/// Checks that a file exists, is a file, and does not exceed `max_size` bytes.
pub fn check_file(path: &Path, max_size: u64) -> Result<(), ScorerFailure> {
    if !path.exists() {
        return Err(failure(
            "File not found: {file}",
            path,
            format!("File not found: {}", path.display()),
        ));
    }

    if !path.is_file() {
        return Err(failure(
            "Not a regular file: {file}",
            path,
            format!("Not a file: {}", path.display()),
        ));
    }

    let metadata = fs::metadata(path).map_err(|e| {
        failure(
            "File unreadable: {file}",
            path,
            format!("File unreadable: {} - {}", path.display(), e),
        )
    })?;

    if metadata.len() > max_size {
        return Err(failure(
            "File too large: {file}",
            path,
            format!(
                "File too large: {} ({} bytes, max {} bytes)",
                path.display(),
                metadata.len(),
                max_size
            ),
        ));
    }

    Ok(())
}

/// Read a text file after [`check_file`]. Invalid UTF-8 is replaced, not rejected.
pub fn read_text(path: &Path, max_size: u64) -> Result<String, ScorerFailure> {
    check_file(path, max_size)?;
    let bytes = fs::read(path).map_err(|e| {
        failure(
            "File unreadable: {file}",
            path,
            format!("Failed to read {}: {}", path.display(), e),
        )
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
