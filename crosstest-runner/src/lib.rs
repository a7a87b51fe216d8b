//! # crosstest-runner
//!
//! Per-project lifecycle and bounded-concurrency orchestration.
//!
//! Build a [`RunContext`], hand it to a [`ConcurrencyCoordinator`] together
//! with the filtered projects and an [`Action`], and read back a
//! [`crosstest_core::RunSummary`].

pub mod aggregator;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod logger;
pub mod runner;
pub mod validation;

pub use aggregator::ResultAggregator;
pub use context::{Lifecycle, RunContext};
pub use coordinator::ConcurrencyCoordinator;
pub use error::RunError;
pub use executor::{quote_arg, CommandExecutor, CommandOutput, ShellExecutor, TaskInvocation};
pub use logger::{FanOutSink, FileSink, LogLevel, LogSink, ProjectLogger, TracingSink};
pub use runner::{Action, ProjectRunner, RunnerState};
pub use validation::{Evidence, ValidationReport, Validator};
