//! Global grader configuration manager.
//!
//! `GraderConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. Only the harness
//! reads it; scorers are configured exclusively through their constructors.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete harness configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// Deployment environment (`APP_ENV`), reported in the startup log.
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub scorer_timeout_secs: u64,
    pub coverage_artifact: String,
}

/// Lazily-initialized, thread-safe singleton instance of `GraderConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<GraderConfig>> = OnceLock::new();

fn parse_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {}={:?}", key, raw);
            fallback
        }),
        Err(_) => fallback,
    }
}

impl GraderConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every value has a default, so loading never fails. Malformed numeric
    /// values fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "grader".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "grader=info,scorer=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "grader.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            scorer_timeout_secs: parse_or("SCORER_TIMEOUT_SECS", 60),
            coverage_artifact: env::var("COVERAGE_ARTIFACT")
                .unwrap_or_else(|_| "coverage.json".into()),
        }
    }

    /// Returns a snapshot of the global configuration.
    pub fn global() -> GraderConfig {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(GraderConfig::from_env()));
        match lock.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = match lock.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = GraderConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut GraderConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(GraderConfig::from_env()));
        let mut guard = match lock.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        GraderConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        GraderConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        GraderConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        GraderConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_scorer_timeout_secs(value: u64) {
        GraderConfig::set_field(|cfg| cfg.scorer_timeout_secs = value);
    }

    pub fn set_coverage_artifact(value: impl Into<String>) {
        GraderConfig::set_field(|cfg| cfg.coverage_artifact = value.into());
    }
}

pub fn app_env() -> String {
    GraderConfig::global().env
}

pub fn project_name() -> String {
    GraderConfig::global().project_name
}

pub fn log_level() -> String {
    GraderConfig::global().log_level
}

pub fn log_file() -> String {
    GraderConfig::global().log_file
}

pub fn log_to_stdout() -> bool {
    GraderConfig::global().log_to_stdout
}

pub fn scorer_timeout_secs() -> u64 {
    GraderConfig::global().scorer_timeout_secs
}

pub fn coverage_artifact() -> String {
    GraderConfig::global().coverage_artifact
}
