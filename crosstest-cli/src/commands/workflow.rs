//! `crosstest workflow`: a named sequence of tasks per project.

use anyhow::Result;
use clap::Args;

use crosstest_runner::Action;

use super::{run_action, GlobalArgs, LifecycleArgs};

/// Arguments for `crosstest workflow`.
#[derive(Args, Debug)]
pub struct WorkflowArgs {
    /// Workflow defined under `workflows:` in the project set.
    pub name: String,

    /// Regular expression matched against the whole project name.
    pub pattern: Option<String>,

    #[command(flatten)]
    pub lifecycle: LifecycleArgs,
}

impl WorkflowArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<bool> {
        let lifecycle = (&self.lifecycle).into();
        run_action(
            global,
            self.pattern.as_deref(),
            Action::Workflow(self.name),
            lifecycle,
        )
    }
}
