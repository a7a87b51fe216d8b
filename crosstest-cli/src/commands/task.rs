//! `crosstest task`: one task, or a literal command, per project.

use anyhow::Result;
use clap::Args;

use crosstest_runner::Action;

use super::{run_action, GlobalArgs, LifecycleArgs};

/// Arguments for `crosstest task`.
#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Task name, or the command to run when `--exec` is given.
    pub task: String,

    /// Regular expression matched against the whole project name.
    pub pattern: Option<String>,

    /// Run `task` as a shell command in each project instead of a task script.
    #[arg(long)]
    pub exec: bool,

    /// Skip projects that do not implement the task instead of failing them.
    #[arg(long, conflicts_with = "exec")]
    pub skip_missing: bool,

    #[command(flatten)]
    pub lifecycle: LifecycleArgs,
}

impl TaskArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<bool> {
        let lifecycle = (&self.lifecycle).into();
        run_action(global, self.pattern.as_deref(), self.action(), lifecycle)
    }

    fn action(&self) -> Action {
        if self.exec {
            Action::Exec(self.task.clone())
        } else if self.skip_missing {
            Action::optional_task(&self.task)
        } else {
            Action::task(&self.task)
        }
    }
}
