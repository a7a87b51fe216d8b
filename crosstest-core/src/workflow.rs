//! Workflow catalog: named, ordered task lists.

use serde::Deserialize;
use serde_yaml::Mapping;

use crate::error::{ConfigError, UndefinedWorkflow};
use crate::registry::key_name;
use crate::types::Workflow;

/// A workflow body is either a bare task list or `{ tasks: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkflowDef {
    Tasks(Vec<String>),
    Table { tasks: Vec<String> },
}

/// Every workflow defined in the project set, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct WorkflowCatalog {
    workflows: Vec<Workflow>,
}

impl WorkflowCatalog {
    pub fn load(data: &Mapping) -> Result<Self, ConfigError> {
        let mut workflows = Vec::with_capacity(data.len());
        for (key, value) in data {
            let name = key_name(key, "workflow")?;
            let def: WorkflowDef = serde_yaml::from_value(value.clone()).map_err(|source| {
                ConfigError::MalformedWorkflow {
                    name: name.clone(),
                    source,
                }
            })?;
            workflows.push(Workflow::try_new(name, def.into_tasks())?);
        }
        Ok(Self { workflows })
    }

    /// The ordered task names for `name`. Pure lookup.
    pub fn resolve(&self, name: &str) -> Result<&[String], UndefinedWorkflow> {
        self.workflows
            .iter()
            .find(|w| w.name == name)
            .map(|w| w.tasks.as_slice())
            .ok_or_else(|| UndefinedWorkflow {
                name: name.to_owned(),
            })
    }

    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }
}

impl FromIterator<Workflow> for WorkflowCatalog {
    fn from_iter<I: IntoIterator<Item = Workflow>>(iter: I) -> Self {
        Self {
            workflows: iter.into_iter().collect(),
        }
    }
}

impl WorkflowDef {
    fn into_tasks(self) -> Vec<String> {
        match self {
            WorkflowDef::Tasks(tasks) | WorkflowDef::Table { tasks } => tasks,
        }
    }
}

impl Workflow {
    /// Rejects a workflow with no tasks.
    pub fn try_new(name: impl Into<String>, tasks: Vec<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if tasks.is_empty() {
            return Err(ConfigError::EmptyWorkflow { name });
        }
        Ok(Self { name, tasks })
    }
}
