//! `crosstest clone` and `crosstest bootstrap`.

use anyhow::Result;
use clap::Args;

use crosstest_runner::{Action, Lifecycle};

use super::{run_action, GlobalArgs};

#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Regular expression matched against the whole project name.
    pub pattern: Option<String>,
}

impl CloneArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<bool> {
        run_action(
            global,
            self.pattern.as_deref(),
            Action::Clone,
            Lifecycle::default(),
        )
    }
}

#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Regular expression matched against the whole project name.
    pub pattern: Option<String>,

    /// Clone missing projects first.
    #[arg(long)]
    pub clone: bool,
}

impl BootstrapArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<bool> {
        let lifecycle = Lifecycle {
            clone: self.clone,
            bootstrap: false,
        };
        run_action(global, self.pattern.as_deref(), Action::Bootstrap, lifecycle)
    }
}
