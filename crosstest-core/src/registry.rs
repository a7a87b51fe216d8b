//! Project set loading and filtering.
//!
//! # Source format
//!
//! ```text
//! projects:
//!   ruby:
//!     language: ruby
//!     basedir: sdks/ruby                       (default: projects/<name>)
//!     git: https://github.com/org/ruby_samples (or a mapping, below)
//!   java:
//!     language: java
//!     git:
//!       repo: https://github.com/org/java_samples
//!       branch: main                           (default: master)
//!       to: sdks/java                          (default: basedir)
//! workflows:
//!   ci: [bootstrap, lint, test]
//! ```
//!
//! Registration order is the order of keys in the `projects` mapping.
//! Every default is applied here, so a loaded [`Project`] never changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;
use crate::types::{GitOptions, Project, ProjectName, DEFAULT_BRANCH};
use crate::workflow::WorkflowCatalog;

// ---------------------------------------------------------------------------
// 1. Decoded input
// ---------------------------------------------------------------------------

/// Project-set structure as decoded from YAML, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSetData {
    pub projects: Mapping,
    #[serde(default)]
    pub workflows: Mapping,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectDef {
    language: Option<String>,
    basedir: Option<PathBuf>,
    git: Option<GitDef>,
}

/// `git:` accepts a bare repo URL or a mapping; anything else is rejected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitDef {
    Repo(String),
    Options(GitOptionsDef),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GitOptionsDef {
    repo: String,
    branch: Option<String>,
    to: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// 2. Registry
// ---------------------------------------------------------------------------

/// Every project in the set, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<Arc<Project>>,
}

impl ProjectRegistry {
    /// Build projects from decoded data, naming each from its map key.
    ///
    /// Returns [`ConfigError`] for non-string keys, unknown fields, or a `git`
    /// value that is neither a string nor a mapping with `repo`.
    pub fn load(data: &ProjectSetData) -> Result<Self, ConfigError> {
        let mut projects = Vec::with_capacity(data.projects.len());
        for (key, value) in &data.projects {
            let name = key_name(key, "project")?;
            let def: ProjectDef = match value {
                Value::Null => ProjectDef::default(),
                other => serde_yaml::from_value(other.clone()).map_err(|source| {
                    ConfigError::MalformedProject {
                        name: name.clone(),
                        source,
                    }
                })?,
            };
            projects.push(Arc::new(build_project(ProjectName::from(name), def)));
        }
        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[Arc<Project>] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, name: &ProjectName) -> Option<&Arc<Project>> {
        self.projects.iter().find(|p| p.name() == name)
    }

    /// Projects whose whole name matches `pattern`, in registration order.
    ///
    /// `None` or an empty pattern matches every project.
    pub fn filter(&self, pattern: Option<&str>) -> Result<Vec<Arc<Project>>, ConfigError> {
        let pattern = match pattern {
            Some(p) if !p.is_empty() => p,
            _ => return Ok(self.projects.clone()),
        };
        let re = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            }
        })?;
        Ok(self
            .projects
            .iter()
            .filter(|p| re.is_match(p.name().as_str()))
            .cloned()
            .collect())
    }
}

fn build_project(name: ProjectName, def: ProjectDef) -> Project {
    let basedir = def
        .basedir
        .unwrap_or_else(|| Project::default_basedir(&name));
    let git = def.git.map(|git| {
        let (repo, branch, to) = match git {
            GitDef::Repo(repo) => (repo, None, None),
            GitDef::Options(o) => (o.repo, o.branch, o.to),
        };
        GitOptions {
            repo,
            branch: branch.unwrap_or_else(|| DEFAULT_BRANCH.to_owned()),
            to: to.unwrap_or_else(|| basedir.clone()),
        }
    });
    Project::new(name, basedir, def.language, git)
}

pub(crate) fn key_name(key: &Value, kind: &'static str) -> Result<String, ConfigError> {
    match key {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        other => Err(ConfigError::InvalidName {
            kind,
            key: serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_owned())
                .unwrap_or_else(|_| format!("{other:?}")),
        }),
    }
}

// ---------------------------------------------------------------------------
// 3. Project set (projects + workflows)
// ---------------------------------------------------------------------------

/// A loaded project set: registry, workflow catalog, and the workspace root
/// that relative basedirs resolve against.
#[derive(Debug, Clone)]
pub struct ProjectSet {
    pub root: PathBuf,
    pub registry: ProjectRegistry,
    pub workflows: WorkflowCatalog,
}

impl ProjectSet {
    /// Validate decoded data into a project set rooted at `root`.
    pub fn load(root: impl Into<PathBuf>, data: &ProjectSetData) -> Result<Self, ConfigError> {
        Ok(Self {
            root: root.into(),
            registry: ProjectRegistry::load(data)?,
            workflows: WorkflowCatalog::load(&data.workflows)?,
        })
    }

    /// Decode and validate a YAML document.
    pub fn from_yaml_str(root: impl Into<PathBuf>, yaml: &str) -> Result<Self, ConfigError> {
        let data: ProjectSetData = serde_yaml::from_str(yaml)?;
        Self::load(root, &data)
    }

    /// Load a project-set file. The workspace root is the file's directory.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data: ProjectSetData =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let root = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::load(root, &data)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SET: &str = r#"
projects:
  ruby:
    language: ruby
    basedir: sdks/ruby
    git: https://example.com/ruby_samples
  java:
    language: java
    git:
      repo: https://example.com/java_samples
      branch: main
  python:
    language: python
    git:
      repo: https://example.com/python_samples
      to: checkouts/python
"#;

    fn registry() -> ProjectRegistry {
        ProjectSet::from_yaml_str(".", SET).expect("load").registry
    }

    fn names(projects: &[Arc<Project>]) -> Vec<&str> {
        projects.iter().map(|p| p.name().as_str()).collect()
    }

    #[test]
    fn load_keeps_registration_order() {
        assert_eq!(names(registry().projects()), ["ruby", "java", "python"]);
    }

    #[test]
    fn bare_string_git_becomes_repo_with_defaults() {
        let reg = registry();
        let ruby = reg.get(&ProjectName::from("ruby")).expect("ruby");
        let git = ruby.git.as_ref().expect("git");
        assert_eq!(git.repo, "https://example.com/ruby_samples");
        assert_eq!(git.branch, "master");
        assert_eq!(git.to, PathBuf::from("sdks/ruby"));
    }

    #[test]
    fn basedir_defaults_to_projects_dir() {
        let reg = registry();
        let java = reg.get(&ProjectName::from("java")).expect("java");
        assert_eq!(java.basedir, PathBuf::from("projects/java"));
        let git = java.git.as_ref().expect("git");
        assert_eq!(git.branch, "main");
        assert_eq!(git.to, PathBuf::from("projects/java"));
    }

    #[test]
    fn explicit_clone_target_is_kept() {
        let reg = registry();
        let python = reg.get(&ProjectName::from("python")).expect("python");
        assert_eq!(
            python.git.as_ref().expect("git").to,
            PathBuf::from("checkouts/python")
        );
    }

    #[test]
    fn null_project_body_uses_defaults() {
        let set = ProjectSet::from_yaml_str(".", "projects:\n  go:\n").expect("load");
        let go = &set.registry.projects()[0];
        assert_eq!(go.basedir, PathBuf::from("projects/go"));
        assert!(go.git.is_none());
        assert!(go.language.is_none());
    }

    #[test]
    fn non_string_git_is_rejected() {
        let err = ProjectSet::from_yaml_str(".", "projects:\n  go:\n    git: 42\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProject { ref name, .. } if name == "go"));
    }

    #[test]
    fn git_mapping_without_repo_is_rejected() {
        let yaml = "projects:\n  go:\n    git:\n      branch: main\n";
        let err = ProjectSet::from_yaml_str(".", yaml).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProject { .. }), "got: {err}");
    }

    #[test]
    fn unknown_project_field_is_rejected() {
        let yaml = "projects:\n  go:\n    langauge: go\n";
        let err = ProjectSet::from_yaml_str(".", yaml).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProject { .. }), "got: {err}");
    }

    #[test]
    fn missing_projects_key_is_decode_error() {
        let err = ProjectSet::from_yaml_str(".", "workflows: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)), "got: {err}");
    }

    #[test]
    fn non_string_project_key_is_rejected() {
        let err = ProjectSet::from_yaml_str(".", "projects:\n  1:\n    language: c\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName { kind: "project", .. }), "got: {err}");
    }

    #[test]
    fn filter_matches_whole_name_in_registration_order() {
        let reg = registry();
        assert_eq!(names(&reg.filter(Some("p.*|r.*")).expect("filter")), ["ruby", "python"]);
        assert!(reg.filter(Some("ja")).expect("filter").is_empty());
        assert_eq!(names(&reg.filter(Some("java")).expect("filter")), ["java"]);
    }

    #[test]
    fn empty_pattern_matches_all() {
        let reg = registry();
        assert_eq!(names(&reg.filter(None).expect("filter")), ["ruby", "java", "python"]);
        assert_eq!(names(&reg.filter(Some("")).expect("filter")), ["ruby", "java", "python"]);
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = registry().filter(Some("(")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
