use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::languages::Language;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionLimits {
    /// Wall-clock budget for a single scorer evaluation. `0` disables the limit.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest source or data file a scorer is willing to read.
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_source_bytes: default_max_source_bytes(),
        }
    }
}

impl ExecutionLimits {
    /// The per-scorer time limit, or `None` when disabled.
    pub fn time_limit(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectSetup {
    #[serde(default = "default_language")]
    pub language: Language,
}

impl Default for ProjectSetup {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub execution: ExecutionLimits,

    #[serde(default)]
    pub project: ProjectSetup,
}

impl ExecutionConfig {
    pub fn default_config() -> Self {
        ExecutionConfig {
            execution: ExecutionLimits::default(),
            project: ProjectSetup::default(),
        }
    }

    /// Load an execution config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid config JSON in {}: {}", path.display(), e))
    }

    /// Save the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        crate::paths::ensure_parent_dir(path)
            .map_err(|e| format!("Failed to create config directory: {:?}", e))?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config to JSON: {}", e))?;
        fs::write(path, json).map_err(|e| format!("Failed to write config file: {}", e))
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_source_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_language() -> Language {
    Language::Python
}
