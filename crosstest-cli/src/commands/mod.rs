//! Subcommands and the plumbing they share.

pub mod lifecycle;
pub mod list;
pub mod summary;
pub mod task;
pub mod workflow;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crosstest_core::{
    config::{DEFAULT_LOG_ROOT, DEFAULT_PROJECT_SET},
    format_duration, Configuration, ProjectSet,
};
use crosstest_runner::{
    Action, ConcurrencyCoordinator, FanOutSink, FileSink, Lifecycle, LogSink, RunContext,
    ShellExecutor, TracingSink,
};

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Project-set file. Its directory is the workspace root.
    #[arg(long, short = 'f', global = true, default_value = DEFAULT_PROJECT_SET)]
    pub file: PathBuf,

    /// Maximum number of projects to run at the same time.
    #[arg(long, short = 'c', global = true, default_value_t = 1)]
    pub concurrency: usize,

    /// trace | debug | info | warn | error. `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Directory for per-project log files, relative to the workspace root.
    #[arg(long, global = true, value_name = "DIR")]
    pub log_root: Option<PathBuf>,

    /// Do not write per-project log files.
    #[arg(long, global = true, conflicts_with = "log_root")]
    pub no_log_files: bool,

    /// Log the commands that would run without running them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Emit machine-readable JSON instead of a table.
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    pub fn configuration(&self) -> Configuration {
        let log_root = if self.no_log_files {
            None
        } else {
            Some(
                self.log_root
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_ROOT)),
            )
        };
        Configuration {
            project_set: self.file.clone(),
            log_root,
            log_level: self.log_level.clone(),
            concurrency: self.concurrency,
            dry_run: self.dry_run,
        }
    }

    /// Validated configuration plus the project set it points at.
    pub fn load(&self) -> Result<(Configuration, ProjectSet)> {
        let config = self.configuration();
        config.validate().context("invalid configuration")?;
        let set = ProjectSet::load_file(&config.project_set).with_context(|| {
            format!(
                "failed to load project set {}",
                config.project_set.display()
            )
        })?;
        Ok((config, set))
    }
}

/// `--clone` / `--bootstrap` pre-steps.
#[derive(Args, Debug, Default)]
pub struct LifecycleArgs {
    /// Clone missing projects before the action.
    #[arg(long)]
    pub clone: bool,

    /// Run the bootstrap task before the action.
    #[arg(long)]
    pub bootstrap: bool,
}

impl From<&LifecycleArgs> for Lifecycle {
    fn from(args: &LifecycleArgs) -> Self {
        Lifecycle {
            clone: args.clone,
            bootstrap: args.bootstrap,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared run
// ---------------------------------------------------------------------------

/// Run `action` over the projects matching `pattern`, print the summary, and
/// report whether every project succeeded or was skipped.
///
/// Configuration problems (bad flags, unreadable project set, bad pattern,
/// undefined workflow) are returned as errors before any project starts.
pub fn run_action(
    global: &GlobalArgs,
    pattern: Option<&str>,
    action: Action,
    lifecycle: Lifecycle,
) -> Result<bool> {
    let (config, set) = global.load()?;

    if let Action::Workflow(name) = &action {
        set.workflows.resolve(name)?;
    }
    let projects = set
        .registry
        .filter(pattern)
        .context("invalid project pattern")?;

    let sink = build_sink(&config, &set)?;
    let ctx = RunContext::for_project_set(&set, Arc::new(ShellExecutor::new(config.dry_run)))
        .with_sink(sink)
        .with_lifecycle(lifecycle);

    tracing::info!(
        "-----> Starting Crosstest (v{}) with concurrency {}",
        env!("CARGO_PKG_VERSION"),
        config.concurrency
    );

    let total = projects.len();
    let done = AtomicUsize::new(0);
    let summary = ConcurrencyCoordinator::new(Arc::new(ctx), config.concurrency)
        .on_result(move |result| {
            let n = done.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!("[{n}/{total}] {}: {} {}", result.project, result.name, result.outcome);
        })
        .run(&projects, &action)
        .context("run did not complete")?;

    tracing::info!(
        "-----> Crosstest is finished. {}",
        format_duration(summary.duration)
    );

    if global.json {
        summary::print_json(&summary)?;
    } else {
        summary::print_table(&summary);
    }
    Ok(summary.success)
}

fn build_sink(config: &Configuration, set: &ProjectSet) -> Result<Arc<dyn LogSink>> {
    let Some(log_root) = &config.log_root else {
        return Ok(Arc::new(TracingSink));
    };
    let root = set.root.join(log_root);
    let files = FileSink::new(&root)
        .with_context(|| format!("cannot create log directory {}", root.display()))?;
    Ok(Arc::new(FanOutSink::new(vec![
        Arc::new(TracingSink) as Arc<dyn LogSink>,
        Arc::new(files) as Arc<dyn LogSink>,
    ])))
}
