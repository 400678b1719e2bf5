use serde::{Deserialize, Serialize};
use std::path::Path;

/// Languages whose submissions can be style-checked and whose test files can be discovered.
/// Serialized/deserialized in `lowercase` for config JSON.
/// Common aliases are accepted (e.g., "cc", "c++", "golang").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    C,
    #[serde(alias = "cc", alias = "c++")]
    Cpp,
    Java,
    Rust,
    #[serde(alias = "golang")]
    Go,
}

impl Language {
    /// Lowercase file extensions (without the dot) recognised as source files.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "h", "hpp"],
            Language::Java => &["java"],
            Language::Rust => &["rs"],
            Language::Go => &["go"],
        }
    }

    /// Default regex a relative path must match, from its start, to count as a test file.
    pub fn default_test_pattern(self) -> &'static str {
        match self {
            Language::Python => r"test_.*\.py$",
            Language::C => r"test_.*\.c$",
            Language::Cpp => r"test_.*\.(cpp|cc|cxx)$",
            Language::Java => r".*Test\.java$",
            Language::Rust => r"tests/.*\.rs$",
            Language::Go => r".*_test\.go$",
        }
    }
}

pub trait LanguageExt {
    /// Does `path` carry one of this language's source extensions? (case-insensitive)
    fn is_source_file(&self, path: &Path) -> bool;
}

impl LanguageExt for Language {
    fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.extensions().iter().any(|known| *known == e)
            })
            .unwrap_or(false)
    }
}
