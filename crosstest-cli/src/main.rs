//! Crosstest: run tasks and workflows across many SDK projects.
//!
//! # Usage
//!
//! ```text
//! crosstest task <task> [pattern] [--skip-missing] [--clone] [--bootstrap]
//! crosstest task <command> [pattern] --exec
//! crosstest workflow <name> [pattern] [--clone] [--bootstrap]
//! crosstest clone [pattern]
//! crosstest bootstrap [pattern] [--clone]
//! crosstest list [pattern]
//! ```
//!
//! Global flags: `--file`, `-c/--concurrency`, `--log-level`, `--log-root`,
//! `--no-log-files`, `--dry-run`, `--json`.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    lifecycle::{BootstrapArgs, CloneArgs},
    list::ListArgs,
    task::TaskArgs,
    workflow::WorkflowArgs,
    GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "crosstest",
    version,
    about = "Run tasks and workflows across a set of SDK projects",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one task (or, with --exec, a literal command) in every matching project.
    Task(TaskArgs),

    /// Run a named workflow in every matching project.
    Workflow(WorkflowArgs),

    /// Clone every matching project that is not checked out yet.
    Clone(CloneArgs),

    /// Run the bootstrap task in every matching project.
    Bootstrap(BootstrapArgs),

    /// List the projects of the project set.
    List(ListArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.global.log_level);

    let success = match cli.command {
        Commands::Task(args) => args.run(&cli.global)?,
        Commands::Workflow(args) => args.run(&cli.global)?,
        Commands::Clone(args) => args.run(&cli.global)?,
        Commands::Bootstrap(args) => args.run(&cli.global)?,
        Commands::List(args) => args.run(&cli.global)?,
    };
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so stdout carries only the summary. `RUST_LOG` wins
/// over `--log-level`.
fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
