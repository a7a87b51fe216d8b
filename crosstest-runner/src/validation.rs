//! Contract validation seam.
//!
//! Validators are registered on the [`crate::RunContext`] by the application;
//! the runner hands each one the evidence captured from a successful task.

use crosstest_core::ProjectName;

use crate::executor::CommandOutput;

/// What a task produced, as seen by validators.
#[derive(Debug, Clone)]
pub struct Evidence<'a> {
    pub project: &'a ProjectName,
    pub task: &'a str,
    pub output: &'a CommandOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub passed: bool,
    pub details: String,
}

impl ValidationReport {
    pub fn pass() -> Self {
        Self {
            passed: true,
            details: String::new(),
        }
    }

    pub fn fail(details: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: details.into(),
        }
    }
}

pub trait Validator: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    fn validate(&self, evidence: &Evidence<'_>) -> ValidationReport;
}
