//! Bounded-concurrency dispatch of project runners.
//!
//! Every project gets its own tokio task that waits for a semaphore permit,
//! then runs its [`ProjectRunner`] on the blocking pool. At most
//! `concurrency` runners hold a permit at once. Results flow back over one
//! channel to a single consumer that feeds the [`ResultAggregator`], so no
//! lock guards the result list.
//!
//! A project's failure, or even a panic inside its runner, only produces a
//! Failed result for that project; nothing is cancelled.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};

use crosstest_core::{Project, RunSummary, TaskResult};

use crate::aggregator::ResultAggregator;
use crate::context::RunContext;
use crate::error::{io_err, RunError};
use crate::runner::{Action, ProjectRunner};

type ProgressFn = dyn Fn(&TaskResult) + Send + Sync;

pub struct ConcurrencyCoordinator {
    ctx: Arc<RunContext>,
    concurrency: usize,
    progress: Option<Box<ProgressFn>>,
}

impl ConcurrencyCoordinator {
    /// A `concurrency` of 0 is treated as 1.
    pub fn new(ctx: Arc<RunContext>, concurrency: usize) -> Self {
        Self {
            ctx,
            concurrency: concurrency.max(1),
            progress: None,
        }
    }

    /// Called with each result as soon as it arrives, in completion order.
    pub fn on_result(mut self, progress: impl Fn(&TaskResult) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `action` for every project and block until all have reported.
    pub fn run(&self, projects: &[Arc<Project>], action: &Action) -> Result<RunSummary, RunError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .max_blocking_threads(self.concurrency)
            .enable_all()
            .build()
            .map_err(|e| io_err("tokio-runtime", e))?;
        runtime.block_on(self.run_async(projects, action))
    }

    pub async fn run_async(
        &self,
        projects: &[Arc<Project>],
        action: &Action,
    ) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let mut aggregator = ResultAggregator::new(projects.iter().map(|p| p.name().clone()));
        tracing::debug!(
            "dispatching {} for {} projects (concurrency {})",
            action.label(),
            projects.len(),
            self.concurrency
        );

        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<TaskResult>();
        let permits = Arc::new(Semaphore::new(self.concurrency));

        for project in projects {
            let project = Arc::clone(project);
            let ctx = Arc::clone(&self.ctx);
            let action = action.clone();
            let permits = Arc::clone(&permits);
            let result_tx = result_tx.clone();

            tokio::spawn(async move {
                let name = project.name().clone();
                let label = action.label().to_owned();
                let _permit = permits.acquire_owned().await.ok();
                let started = Instant::now();

                let joined = tokio::task::spawn_blocking(move || {
                    ProjectRunner::new(project, ctx).run(&action)
                })
                .await;

                let result = joined.unwrap_or_else(|err| {
                    tracing::error!("runner for {name} did not finish: {err}");
                    TaskResult::failed(
                        name,
                        label,
                        started.elapsed(),
                        format!("runner did not finish: {err}"),
                    )
                });
                // Receiver lives until every sender is gone.
                let _ = result_tx.send(result);
            });
        }
        drop(result_tx);

        while let Some(result) = result_rx.recv().await {
            if let Some(progress) = &self.progress {
                progress(&result);
            }
            aggregator.record(result);
        }

        aggregator.finish(started.elapsed());
        aggregator.summary()
    }
}
