//! Crosstest core library: domain types, project set loading, workflows, errors.
//!
//! - [`types`]: projects, workflows, results
//! - [`registry`]: project set decoding and name filtering
//! - [`workflow`]: workflow catalog and resolution
//! - [`config`]: run configuration
//! - [`error`]: [`ConfigError`], [`UndefinedWorkflow`]

pub mod config;
pub mod error;
pub mod registry;
pub mod types;
pub mod workflow;

pub use config::Configuration;
pub use error::{ConfigError, UndefinedWorkflow};
pub use registry::{ProjectRegistry, ProjectSet, ProjectSetData};
pub use types::{
    format_duration, GitOptions, Project, ProjectName, RunSummary, TaskOutcome, TaskResult,
    Workflow,
};
pub use workflow::WorkflowCatalog;
