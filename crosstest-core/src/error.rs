//! Error types for crosstest-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading and validating the project set or run configuration.
///
/// All of these are fatal to the whole run and surface before any project is
/// dispatched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the project-set file.
    #[error("could not load project set at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with path and line context from serde_yaml.
    #[error("failed to parse project set at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The top-level structure is not a project set.
    #[error("malformed project set: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// A project or workflow key was not a non-empty string.
    #[error("invalid {kind} name: {key}")]
    InvalidName { kind: &'static str, key: String },

    #[error("malformed project '{name}': {source}")]
    MalformedProject {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("malformed workflow '{name}': {source}")]
    MalformedWorkflow {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("workflow '{name}' must list at least one task")]
    EmptyWorkflow { name: String },

    #[error("invalid project pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("unknown log level '{0}'; expected: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// A workflow name was not found in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("workflow '{name}' is not defined")]
pub struct UndefinedWorkflow {
    pub name: String,
}
