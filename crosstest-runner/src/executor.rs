//! Command execution collaborator.
//!
//! The runner never spawns processes itself; it goes through a
//! [`CommandExecutor`]. [`ShellExecutor`] is the default used by the CLI:
//! commands run through the platform shell, and a task named `t` is
//! implemented when the project has `scripts/t` or `scripts/t.sh`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;

use crosstest_core::Project;

use crate::error::RunError;

/// Captured result of one finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `-1` when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Whether a project implements a task, and what running it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInvocation {
    Implemented(CommandOutput),
    NotImplemented,
}

/// Runs shell commands and project tasks. Shared by every worker.
pub trait CommandExecutor: Send + Sync {
    /// Run a literal command with `cwd` as working directory.
    fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutput, RunError>;

    /// Run `task` for `project`, whose checkout is at `cwd`.
    fn run_task(&self, project: &Project, cwd: &Path, task: &str)
        -> Result<TaskInvocation, RunError>;
}

// ---------------------------------------------------------------------------
// ShellExecutor
// ---------------------------------------------------------------------------

/// Executor backed by `std::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    dry_run: bool,
}

impl ShellExecutor {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Script implementing `task` inside `cwd`, if any.
    pub fn task_script(cwd: &Path, task: &str) -> Option<PathBuf> {
        let scripts = cwd.join("scripts");
        [scripts.join(task), scripts.join(format!("{task}.sh"))]
            .into_iter()
            .find(|p| p.is_file())
    }

    fn run(&self, mut cmd: Command, label: &str) -> Result<CommandOutput, RunError> {
        if self.dry_run {
            tracing::info!("[dry-run] would run: {label}");
            return Ok(CommandOutput::default());
        }
        tracing::debug!("running: {label}");
        let output = cmd.output().map_err(|source| RunError::Exec {
            command: label.to_owned(),
            source,
        })?;
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutput, RunError> {
        let mut cmd = shell();
        cmd.arg(command).current_dir(cwd);
        self.run(cmd, command)
    }

    fn run_task(
        &self,
        project: &Project,
        cwd: &Path,
        task: &str,
    ) -> Result<TaskInvocation, RunError> {
        let Some(script) = Self::task_script(cwd, task) else {
            return Ok(TaskInvocation::NotImplemented);
        };
        // Relative to `cwd`, which the child runs in.
        let script = script.strip_prefix(cwd).unwrap_or(&script).to_path_buf();
        let mut cmd = script_runner();
        cmd.arg(&script)
            .current_dir(cwd)
            .env("CROSSTEST_PROJECT", project.name().as_str())
            .env("CROSSTEST_TASK", task);
        if let Some(language) = &project.language {
            cmd.env("CROSSTEST_LANGUAGE", language);
        }
        let label = script.display().to_string();
        self.run(cmd, &label).map(TaskInvocation::Implemented)
    }
}

/// Quote `arg` as one word for the shell [`CommandExecutor::execute`] runs
/// commands through. Plain words are returned unchanged.
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@%+=,".contains(c));
    if plain {
        return Cow::Borrowed(arg);
    }
    if cfg!(unix) {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    } else {
        Cow::Owned(format!("\"{}\"", arg.replace('"', "\"\"")))
    }
}

#[cfg(unix)]
fn shell() -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c");
    cmd
}
#[cfg(not(unix))]
fn shell() -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C");
    cmd
}

#[cfg(unix)]
fn script_runner() -> Command {
    Command::new("sh")
}
#[cfg(not(unix))]
fn script_runner() -> Command {
    shell()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
