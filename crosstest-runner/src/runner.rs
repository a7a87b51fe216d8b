//! Drives one project through clone, bootstrap, and task or workflow steps.
//!
//! ```text
//! NotCloned ─clone─▶ Cloned ─bootstrap─▶ Ready ─▶ Running ─▶ Succeeded | Skipped | Failed
//! ```
//!
//! A runner starts in `Cloned` when the project's basedir already exists.
//! Every call to [`ProjectRunner::run`] yields exactly one [`TaskResult`];
//! errors never escape it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crosstest_core::{format_duration, Project, TaskResult};

use crate::context::RunContext;
use crate::error::RunError;
use crate::executor::{quote_arg, CommandOutput, TaskInvocation};
use crate::logger::ProjectLogger;
use crate::validation::Evidence;

pub const BOOTSTRAP_TASK: &str = "bootstrap";

/// What to run for each project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Clone the project's repository if it is not already present.
    Clone,
    /// Run the `bootstrap` task; a missing task is skipped.
    Bootstrap,
    Task {
        name: String,
        /// When false, a missing task is Skipped instead of Failed.
        fail_if_missing: bool,
    },
    Workflow(String),
    /// Run a literal shell command in the project's basedir.
    Exec(String),
}

impl Action {
    pub fn task(name: impl Into<String>) -> Self {
        Action::Task {
            name: name.into(),
            fail_if_missing: true,
        }
    }

    pub fn optional_task(name: impl Into<String>) -> Self {
        Action::Task {
            name: name.into(),
            fail_if_missing: false,
        }
    }

    /// Name results are attributed to.
    pub fn label(&self) -> &str {
        match self {
            Action::Clone => "clone",
            Action::Bootstrap => BOOTSTRAP_TASK,
            Action::Task { name, .. } | Action::Workflow(name) => name,
            Action::Exec(_) => "exec",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    NotCloned,
    Cloned,
    Ready,
    Running,
    Succeeded,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Done,
    Skipped,
}

/// A failed step, with the task it failed in when that differs from the action.
struct Failure {
    error: RunError,
    step: Option<String>,
}

impl From<RunError> for Failure {
    fn from(error: RunError) -> Self {
        Self { error, step: None }
    }
}

impl RunError {
    fn at_step(self, step: &str) -> Failure {
        Failure {
            error: self,
            step: Some(step.to_owned()),
        }
    }
}

pub struct ProjectRunner {
    project: Arc<Project>,
    ctx: Arc<RunContext>,
    logger: ProjectLogger,
    state: RunnerState,
}

impl ProjectRunner {
    pub fn new(project: Arc<Project>, ctx: Arc<RunContext>) -> Self {
        let logger = ProjectLogger::new(project.name().clone(), ctx.sink.clone());
        let state = if project.dir_in(&ctx.root).is_dir() {
            RunnerState::Cloned
        } else {
            RunnerState::NotCloned
        };
        Self {
            project,
            ctx,
            logger,
            state,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Run `action` (plus any lifecycle pre-steps) and report one result.
    pub fn run(&mut self, action: &Action) -> TaskResult {
        let started = Instant::now();
        let label = action.label().to_owned();
        let name = self.project.name().clone();
        let outcome = self.run_steps(action);
        let elapsed = started.elapsed();

        match outcome {
            Ok(StepOutcome::Done) => {
                self.transition(RunnerState::Succeeded);
                self.logger
                    .info(format!("Finished {label} for {name} {}", format_duration(elapsed)));
                TaskResult::succeeded(name, label, elapsed)
            }
            Ok(StepOutcome::Skipped) => {
                self.transition(RunnerState::Skipped);
                self.logger.info(format!("Skipped {label} for {name}"));
                TaskResult::skipped(name, label, elapsed)
            }
            Err(Failure { error, step }) => {
                self.transition(RunnerState::Failed);
                let detail = error_chain(&error);
                self.logger.error(format!("Failed {label} for {name}: {detail}"));
                let result = TaskResult::failed(name, label, elapsed, detail);
                match step {
                    Some(step) => result.with_failed_step(step),
                    None => result,
                }
            }
        }
    }

    fn run_steps(&mut self, action: &Action) -> Result<StepOutcome, Failure> {
        let lifecycle = self.ctx.lifecycle;
        if lifecycle.clone && *action != Action::Clone {
            self.clone_step().map_err(|e| e.at_step("clone"))?;
        }
        if lifecycle.bootstrap && !matches!(action, Action::Clone | Action::Bootstrap) {
            self.bootstrap_step()
                .map_err(|e| e.at_step(BOOTSTRAP_TASK))?;
        }

        match action {
            Action::Clone => self.clone_step().map(|()| StepOutcome::Done).map_err(Failure::from),
            Action::Bootstrap => self.bootstrap_step().map_err(Failure::from),
            Action::Task {
                name,
                fail_if_missing,
            } => self.task_step(name, *fail_if_missing).map_err(Failure::from),
            Action::Workflow(name) => self.workflow_step(name),
            Action::Exec(command) => self.exec_step(command).map_err(Failure::from),
        }
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    fn clone_step(&mut self) -> Result<(), RunError> {
        let project = Arc::clone(&self.project);
        self.logger.banner(format!("Cloning {}", project.name()));
        let Some(git) = project.git.as_ref() else {
            self.logger.info("Skipping clone because there are no git options");
            self.transition(RunnerState::Cloned);
            return Ok(());
        };

        let target = self.ctx.root.join(&git.to);
        if target.exists() {
            self.logger.info(format!(
                "Skipping clone because {} already exists",
                git.to.display()
            ));
        } else {
            let to = git.to.display().to_string();
            let command = format!(
                "git clone {} -b {} {}",
                quote_arg(&git.repo),
                quote_arg(&git.branch),
                quote_arg(&to)
            );
            self.logger.info(format!("Cloning: {command}"));
            let clone_error = |detail: String| RunError::Clone {
                repo: git.repo.clone(),
                target: git.to.clone(),
                detail,
            };
            let output = self
                .ctx
                .executor
                .execute(&command, &self.ctx.root)
                .map_err(|e| clone_error(e.to_string()))?;
            self.log_output(&output);
            if !output.success() {
                return Err(clone_error(format!(
                    "exit status {}: {}",
                    output.exit_code,
                    output.stderr.trim()
                )));
            }
        }
        self.transition(RunnerState::Cloned);
        Ok(())
    }

    fn bootstrap_step(&mut self) -> Result<StepOutcome, RunError> {
        let name = self.project.name().clone();
        self.logger.banner(format!("Bootstrapping {name}"));
        self.ensure_cloned()?;
        let outcome = match self.invoke_task(BOOTSTRAP_TASK) {
            Ok(Some(_)) => StepOutcome::Done,
            Ok(None) => {
                self.logger
                    .warn(format!("Skipping bootstrap for {name}, no bootstrap task exists"));
                StepOutcome::Skipped
            }
            Err(e) => return Err(e.into_action_failed(format!("Failed to bootstrap {name}"))),
        };
        self.transition(RunnerState::Ready);
        Ok(outcome)
    }

    fn task_step(&mut self, task: &str, fail_if_missing: bool) -> Result<StepOutcome, RunError> {
        self.logger
            .banner(format!("Running task {task} for {}", self.project.name()));
        self.ensure_cloned()?;
        self.transition(RunnerState::Running);
        self.execute_task(task, fail_if_missing)
    }

    fn workflow_step(&mut self, workflow: &str) -> Result<StepOutcome, Failure> {
        let tasks = self.ctx.workflows.resolve(workflow).map_err(RunError::from)?.to_vec();
        self.logger.banner(format!(
            "Running workflow {workflow} for {} ({})",
            self.project.name(),
            tasks.join(" → ")
        ));
        self.ensure_cloned()?;
        self.transition(RunnerState::Running);

        for task in &tasks {
            self.logger
                .banner(format!("Running task {task} for {}", self.project.name()));
            self.execute_task(task, true).map_err(|e| e.at_step(task))?;
        }
        Ok(StepOutcome::Done)
    }

    fn exec_step(&mut self, command: &str) -> Result<StepOutcome, RunError> {
        let name = self.project.name().clone();
        self.logger.banner(format!("Executing `{command}` for {name}"));
        self.ensure_cloned()?;
        self.transition(RunnerState::Running);
        let failed = |e: RunError| e.into_action_failed(format!("Failed to execute `{command}` for {name}"));

        let output = self
            .ctx
            .executor
            .execute(command, &self.dir())
            .map_err(failed)?;
        self.log_output(&output);
        if !output.success() {
            return Err(failed(RunError::CommandFailed {
                command: command.to_owned(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            }));
        }
        Ok(StepOutcome::Done)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Runs a task the caller already checked out and announced.
    fn execute_task(&mut self, task: &str, fail_if_missing: bool) -> Result<StepOutcome, RunError> {
        let name = self.project.name().clone();
        match self.invoke_task(task) {
            Ok(Some(_)) => Ok(StepOutcome::Done),
            Ok(None) if fail_if_missing => {
                let err = RunError::TaskNotImplemented {
                    project: name.clone(),
                    task: task.to_owned(),
                };
                self.logger
                    .error(format!("Could not run task {task} for {name}: {err}"));
                Err(err.into_action_failed(format!("Failed to run task {task} for {name}")))
            }
            Ok(None) => {
                self.logger
                    .warn(format!("Skipping {task} for {name}, no {task} task exists"));
                Ok(StepOutcome::Skipped)
            }
            Err(e) => Err(e.into_action_failed(format!("Failed to run task {task} for {name}"))),
        }
    }

    /// `Ok(None)` when the project does not implement `task`.
    fn invoke_task(&self, task: &str) -> Result<Option<CommandOutput>, RunError> {
        let invocation = self.ctx.executor.run_task(&self.project, &self.dir(), task)?;
        let output = match invocation {
            TaskInvocation::NotImplemented => return Ok(None),
            TaskInvocation::Implemented(output) => output,
        };
        self.log_output(&output);
        if !output.success() {
            return Err(RunError::CommandFailed {
                command: task.to_owned(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        let evidence = Evidence {
            project: self.project.name(),
            task,
            output: &output,
        };
        for validator in &self.ctx.validators {
            let report = validator.validate(&evidence);
            if !report.passed {
                return Err(RunError::Validation {
                    task: task.to_owned(),
                    details: format!("{}: {}", validator.name(), report.details),
                });
            }
            self.logger
                .debug(format!("Validation {} passed for {task}", validator.name()));
        }
        Ok(Some(output))
    }

    /// The basedir must exist on disk. A clone step without git options, or
    /// with a `to` other than the basedir, leaves the state `Cloned` without it.
    fn ensure_cloned(&self) -> Result<(), RunError> {
        if self.state == RunnerState::NotCloned || !self.dir().is_dir() {
            return Err(RunError::NotCloned {
                project: self.project.name().clone(),
                basedir: self.project.basedir.clone(),
            });
        }
        Ok(())
    }

    fn dir(&self) -> PathBuf {
        self.project.dir_in(&self.ctx.root)
    }

    fn log_output(&self, output: &CommandOutput) {
        self.logger.info(&output.stdout);
        if output.success() {
            self.logger.info(&output.stderr);
        } else {
            self.logger.warn(&output.stderr);
        }
    }

    fn transition(&mut self, next: RunnerState) {
        self.logger
            .debug(format!("state {:?} -> {:?}", self.state, next));
        self.state = next;
    }
}

/// `message: cause: cause…`, skipping repeats.
fn error_chain(err: &RunError) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        source = std::error::Error::source(cause);
    }
    parts.join(": ")
}
