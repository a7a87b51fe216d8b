//! Shared fixtures: a scripted executor and an in-memory log sink.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crosstest_core::{Project, ProjectName, ProjectSet};
use crosstest_runner::{
    CommandExecutor, CommandOutput, LogLevel, LogSink, RunContext, RunError, TaskInvocation,
};
use tempfile::TempDir;

/// How a scripted task behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail(i32),
    Missing,
    Panic,
}

/// Executor whose tasks follow a script instead of spawning processes.
#[derive(Default)]
pub struct ScriptedExecutor {
    tasks: HashMap<(String, String), Behavior>,
    default: Option<Behavior>,
    clone_exit: i32,
    delay: Duration,
    slow: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behavior for tasks not scripted explicitly. Defaults to `Succeed`.
    pub fn by_default(mut self, behavior: Behavior) -> Self {
        self.default = Some(behavior);
        self
    }

    pub fn task(mut self, project: &str, task: &str, behavior: Behavior) -> Self {
        self.tasks
            .insert((project.to_owned(), task.to_owned()), behavior);
        self
    }

    pub fn clone_exit(mut self, code: i32) -> Self {
        self.clone_exit = code;
        self
    }

    /// Time each task invocation takes.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Extra time every task of `project` takes.
    pub fn slow(mut self, project: &str, delay: Duration) -> Self {
        self.slow.insert(project.to_owned(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// Highest number of task invocations observed running at once.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutput, RunError> {
        self.record(format!("exec:{command}"));
        if command.starts_with("git clone ") && self.clone_exit == 0 {
            // `git clone <repo> -b <branch> <target>`; the target may be quoted.
            let target = command
                .split_once(" -b ")
                .and_then(|(_, rest)| rest.split_once(' '))
                .map(|(_, target)| target.trim_matches('\''));
            if let Some(target) = target {
                std::fs::create_dir_all(cwd.join(target)).expect("create clone target");
            }
        }
        let exit_code = if command.starts_with("git clone ") {
            self.clone_exit
        } else if command.contains("exit 1") {
            1
        } else {
            0
        };
        Ok(CommandOutput {
            exit_code,
            stdout: format!("ran {command}\n"),
            stderr: if exit_code == 0 { String::new() } else { "boom\n".into() },
        })
    }

    fn run_task(
        &self,
        project: &Project,
        _cwd: &Path,
        task: &str,
    ) -> Result<TaskInvocation, RunError> {
        let name = project.name().as_str();
        self.record(format!("{name}:{task}"));

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let delay = self.delay + self.slow.get(name).copied().unwrap_or_default();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let behavior = self
            .tasks
            .get(&(name.to_owned(), task.to_owned()))
            .or(self.default.as_ref())
            .cloned()
            .unwrap_or(Behavior::Succeed);
        match behavior {
            Behavior::Succeed => Ok(TaskInvocation::Implemented(CommandOutput {
                exit_code: 0,
                stdout: format!("{task} ok\n"),
                stderr: String::new(),
            })),
            Behavior::Fail(code) => Ok(TaskInvocation::Implemented(CommandOutput {
                exit_code: code,
                stdout: String::new(),
                stderr: format!("{task} failed\n"),
            })),
            Behavior::Missing => Ok(TaskInvocation::NotImplemented),
            Behavior::Panic => panic!("scripted panic in {name}:{task}"),
        }
    }
}

/// Captures every log line in memory.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(ProjectName, LogLevel, String)>>,
}

impl MemorySink {
    pub fn lines_for(&self, project: &str) -> Vec<(LogLevel, String)> {
        self.lines
            .lock()
            .expect("lock")
            .iter()
            .filter(|(p, _, _)| p.as_str() == project)
            .map(|(_, level, m)| (*level, m.clone()))
            .collect()
    }

    pub fn contains(&self, project: &str, level: LogLevel, needle: &str) -> bool {
        self.lines_for(project)
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, project: &ProjectName, level: LogLevel, message: &str) {
        self.lines
            .lock()
            .expect("lock")
            .push((project.clone(), level, message.to_owned()));
    }
}

/// A workspace with a project set loaded from `yaml` and, for each name in
/// `checked_out`, an existing basedir.
pub struct Workspace {
    pub dir: TempDir,
    pub set: ProjectSet,
}

impl Workspace {
    pub fn new(yaml: &str, checked_out: &[&str]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let set = ProjectSet::from_yaml_str(dir.path(), yaml).expect("project set");
        for name in checked_out {
            let project = set
                .registry
                .get(&ProjectName::from(*name))
                .expect("checked-out project is registered");
            std::fs::create_dir_all(project.dir_in(&set.root)).expect("mkdir basedir");
        }
        Self { dir, set }
    }

    pub fn context(&self, executor: Arc<ScriptedExecutor>, sink: Arc<MemorySink>) -> RunContext {
        RunContext::for_project_set(&self.set, executor).with_sink(sink)
    }

    pub fn project(&self, name: &str) -> Arc<Project> {
        Arc::clone(
            self.set
                .registry
                .get(&ProjectName::from(name))
                .expect("registered"),
        )
    }
}

pub const THREE_SDKS: &str = "\
projects:
  ruby:
    language: ruby
  java:
    language: java
  python:
    language: python
workflows:
  ci: [a, b, c]
";
