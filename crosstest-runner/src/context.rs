//! Everything a runner needs, passed explicitly instead of held globally.

use std::path::PathBuf;
use std::sync::Arc;

use crosstest_core::{ProjectSet, WorkflowCatalog};

use crate::executor::CommandExecutor;
use crate::logger::{LogSink, TracingSink};
use crate::validation::Validator;

/// Steps run before the main action, inside the same result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lifecycle {
    pub clone: bool,
    pub bootstrap: bool,
}

/// Shared, read-only state for one coordinated run.
#[derive(Clone)]
pub struct RunContext {
    /// Workspace root that project basedirs and clone targets resolve against.
    pub root: PathBuf,
    pub executor: Arc<dyn CommandExecutor>,
    pub workflows: Arc<WorkflowCatalog>,
    pub sink: Arc<dyn LogSink>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub lifecycle: Lifecycle,
}

impl RunContext {
    pub fn new(
        root: impl Into<PathBuf>,
        executor: Arc<dyn CommandExecutor>,
        workflows: Arc<WorkflowCatalog>,
    ) -> Self {
        Self {
            root: root.into(),
            executor,
            workflows,
            sink: Arc::new(TracingSink),
            validators: Vec::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Context rooted at a loaded project set, sharing its workflows.
    pub fn for_project_set(set: &ProjectSet, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::new(set.root.clone(), executor, Arc::new(set.workflows.clone()))
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}
