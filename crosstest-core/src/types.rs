//! Domain types for crosstest.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Projects and workflows are built by [`crate::registry`] from decoded YAML;
//! results and summaries are serializable for `--json` output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Branch checked out when a project's git options do not name one.
pub const DEFAULT_BRANCH: &str = "master";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a project in the project set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Where and how to clone a project. Defaults are already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitOptions {
    pub repo: String,
    pub branch: String,
    /// Clone target, relative to the workspace root unless absolute.
    pub to: PathBuf,
}

/// A checked-out code sample or SDK that tasks run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    name: ProjectName,
    /// Relative to the workspace root unless absolute. Defaults to `projects/<name>`.
    pub basedir: PathBuf,
    pub language: Option<String>,
    pub git: Option<GitOptions>,
}

impl Project {
    pub fn new(
        name: ProjectName,
        basedir: PathBuf,
        language: Option<String>,
        git: Option<GitOptions>,
    ) -> Self {
        Self {
            name,
            basedir,
            language,
            git,
        }
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Default basedir for a project with no explicit `basedir`.
    pub fn default_basedir(name: &ProjectName) -> PathBuf {
        PathBuf::from("projects").join(&name.0)
    }

    /// Absolute (or root-relative) location of the project's checkout.
    pub fn dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.basedir)
    }
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

/// A named, ordered sequence of tasks. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    pub name: String,
    pub tasks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Final outcome of one project's task or workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
    Succeeded,
    Skipped,
    Failed,
}

impl TaskOutcome {
    /// `Succeeded` and `Skipped` both count toward an overall pass.
    pub fn is_success(self) -> bool {
        !matches!(self, TaskOutcome::Failed)
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Succeeded => write!(f, "succeeded"),
            TaskOutcome::Skipped => write!(f, "skipped"),
            TaskOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// One project's result for a task or workflow invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    pub project: ProjectName,
    /// Task, workflow, or action label the result is attributed to.
    pub name: String,
    pub outcome: TaskOutcome,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// For a failed workflow, the task that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
}

impl TaskResult {
    pub fn succeeded(project: ProjectName, name: impl Into<String>, duration: Duration) -> Self {
        Self {
            project,
            name: name.into(),
            outcome: TaskOutcome::Succeeded,
            duration,
            error: None,
            failed_step: None,
        }
    }

    pub fn skipped(project: ProjectName, name: impl Into<String>, duration: Duration) -> Self {
        Self {
            outcome: TaskOutcome::Skipped,
            ..Self::succeeded(project, name, duration)
        }
    }

    pub fn failed(
        project: ProjectName,
        name: impl Into<String>,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            outcome: TaskOutcome::Failed,
            error: Some(error.into()),
            ..Self::succeeded(project, name, duration)
        }
    }

    pub fn with_failed_step(mut self, step: impl Into<String>) -> Self {
        self.failed_step = Some(step.into());
        self
    }
}

/// Aggregate of every project's result, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub results: Vec<TaskResult>,
    pub success: bool,
    /// Wall-clock time of the whole run.
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl RunSummary {
    pub fn count(&self, outcome: TaskOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.results {
            write!(f, "{}: {} {}", r.project, r.name, r.outcome)?;
            if let Some(err) = &r.error {
                write!(f, " ({err})")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{} succeeded, {} skipped, {} failed {}",
            self.count(TaskOutcome::Succeeded),
            self.count(TaskOutcome::Skipped),
            self.count(TaskOutcome::Failed),
            format_duration(self.duration)
        )
    }
}

/// Formats a duration as `(XmY.YYs)`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs_f64();
    let minutes = (total / 60.0).floor();
    let seconds = total - minutes * 60.0;
    format!("({}m{:.2}s)", minutes as u64, seconds)
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
