//! Run configuration.
//!
//! Built by the CLI from flags; passed explicitly to everything that needs it.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_PROJECT_SET: &str = "crosstest.yaml";
pub const DEFAULT_LOG_ROOT: &str = ".crosstest/logs";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Project-set YAML file. Its directory is the workspace root.
    pub project_set: PathBuf,
    /// Directory for per-project log files; `None` disables them.
    pub log_root: Option<PathBuf>,
    pub log_level: String,
    /// Maximum number of projects run at the same time.
    pub concurrency: usize,
    /// Log commands instead of running them.
    pub dry_run: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            project_set: PathBuf::from(DEFAULT_PROJECT_SET),
            log_root: Some(PathBuf::from(DEFAULT_LOG_ROOT)),
            log_level: "info".to_owned(),
            concurrency: 1,
            dry_run: false,
        }
    }
}

impl Configuration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }
}
