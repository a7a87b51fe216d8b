//! Collects per-project results into a [`RunSummary`].

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crosstest_core::{ProjectName, RunSummary, TaskResult};

use crate::error::RunError;

/// Accumulates results as they arrive, in any order.
///
/// Owned by a single consumer; workers hand results over through the
/// coordinator's channel rather than appending here directly.
#[derive(Debug)]
pub struct ResultAggregator {
    /// Registration position of each expected project.
    order: HashMap<ProjectName, usize>,
    /// Expected projects that have reported at least once.
    seen: HashSet<ProjectName>,
    results: Vec<TaskResult>,
    elapsed: Option<Duration>,
}

impl ResultAggregator {
    /// `projects` gives the registration order the summary is reported in.
    pub fn new<I>(projects: I) -> Self
    where
        I: IntoIterator<Item = ProjectName>,
    {
        let order = projects
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        Self {
            order,
            seen: HashSet::new(),
            results: Vec::new(),
            elapsed: None,
        }
    }

    pub fn record(&mut self, result: TaskResult) {
        if !self.order.contains_key(&result.project) {
            tracing::warn!("result for unexpected project {}", result.project);
        } else if !self.seen.insert(result.project.clone()) {
            tracing::warn!("second result for project {}", result.project);
        }
        self.results.push(result);
    }

    /// Number of distinct expected projects that have reported.
    pub fn reported(&self) -> usize {
        self.seen.len()
    }

    pub fn expected(&self) -> usize {
        self.order.len()
    }

    /// Mark the run complete with its wall-clock duration.
    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed = Some(elapsed);
    }

    /// Results in registration order, with the overall verdict.
    ///
    /// Fails with [`RunError::IncompleteRun`] until [`finish`](Self::finish)
    /// has been called and every expected project has reported.
    pub fn summary(&self) -> Result<RunSummary, RunError> {
        let incomplete = RunError::IncompleteRun {
            reported: self.reported(),
            expected: self.expected(),
        };
        let Some(duration) = self.elapsed else {
            return Err(incomplete);
        };
        if self.reported() < self.expected() {
            return Err(incomplete);
        }

        let mut results = self.results.clone();
        results.sort_by_key(|r| self.order.get(&r.project).copied().unwrap_or(usize::MAX));
        let success = results.iter().all(|r| r.outcome.is_success());
        Ok(RunSummary {
            results,
            success,
            duration,
        })
    }
}
