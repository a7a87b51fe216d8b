//! Error types for crosstest-runner.

use std::path::PathBuf;

use thiserror::Error;

use crosstest_core::{ProjectName, UndefinedWorkflow};

/// Every way a project's run can fail.
///
/// None of these escape the coordinator; each becomes a Failed result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    UndefinedWorkflow(#[from] UndefinedWorkflow),

    #[error("failed to clone {repo} into {}: {detail}", .target.display())]
    Clone {
        repo: String,
        target: PathBuf,
        detail: String,
    },

    #[error("project {project} has not been cloned ({} is missing)", .basedir.display())]
    NotCloned {
        project: ProjectName,
        basedir: PathBuf,
    },

    #[error("task {task} is not implemented for {project}")]
    TaskNotImplemented { project: ProjectName, task: String },

    /// A hard failure, wrapping the underlying cause.
    #[error("{message}")]
    ActionFailed {
        message: String,
        #[source]
        source: Box<RunError>,
    },

    #[error("`{command}` exited with status {exit_code}{}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// The executor could not start the command at all.
    #[error("could not run `{command}`: {source}")]
    Exec {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation failed for {task}: {details}")]
    Validation { task: String, details: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `summary()` was called before every dispatched project reported.
    #[error("run is incomplete: {reported} of {expected} projects reported")]
    IncompleteRun { reported: usize, expected: usize },
}

impl RunError {
    /// Wrap `self` as the cause of an [`RunError::ActionFailed`].
    pub fn into_action_failed(self, message: impl Into<String>) -> RunError {
        RunError::ActionFailed {
            message: message.into(),
            source: Box::new(self),
        }
    }

    /// Innermost cause, looking through `ActionFailed` wrappers.
    pub fn root_cause(&self) -> &RunError {
        match self {
            RunError::ActionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Convenience constructor for [`RunError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RunError {
    RunError::Io {
        path: path.into(),
        source,
    }
}
