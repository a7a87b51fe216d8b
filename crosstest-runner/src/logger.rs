//! Project-scoped logging.
//!
//! Every runner logs through a [`ProjectLogger`], a cheap handle pairing the
//! project name with a shared [`LogSink`]. Sinks are called from many worker
//! threads at once; each call delivers one whole line.

use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crosstest_core::ProjectName;

use crate::error::{io_err, RunError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    /// Step header, shown at info level with a marker.
    Banner,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => f.pad("DEBUG"),
            LogLevel::Info => f.pad("INFO"),
            LogLevel::Banner => f.pad("BANNER"),
            LogLevel::Warn => f.pad("WARN"),
            LogLevel::Error => f.pad("ERROR"),
        }
    }
}

/// Destination for project log lines. Must not interleave concurrent lines.
pub trait LogSink: Send + Sync {
    fn write_line(&self, project: &ProjectName, level: LogLevel, message: &str);
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Forwards each line as one `tracing` event tagged with the project.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, project: &ProjectName, level: LogLevel, message: &str) {
        let project = project.as_str();
        match level {
            LogLevel::Debug => tracing::debug!(project, "{message}"),
            LogLevel::Info => tracing::info!(project, "{message}"),
            LogLevel::Banner => tracing::info!(project, "-----> {message}"),
            LogLevel::Warn => tracing::warn!(project, "{message}"),
            LogLevel::Error => tracing::error!(project, "{message}"),
        }
    }
}

/// Appends to `<root>/<project>.log`, one file per project.
pub struct FileSink {
    root: PathBuf,
    files: Mutex<HashMap<ProjectName, File>>,
}

impl FileSink {
    /// Creates `root` if needed. Files are opened on first write.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RunError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
        Ok(Self {
            root,
            files: Mutex::new(HashMap::new()),
        })
    }

    pub fn path_for(&self, project: &ProjectName) -> PathBuf {
        self.root.join(format!("{}.log", project.as_str()))
    }

    fn open(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }
}

impl LogSink for FileSink {
    fn write_line(&self, project: &ProjectName, level: LogLevel, message: &str) {
        let line = format!(
            "{} {:<6} {message}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level
        );
        let mut files = match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !files.contains_key(project) {
            let path = self.path_for(project);
            match Self::open(&path) {
                Ok(file) => {
                    files.insert(project.clone(), file);
                }
                Err(err) => {
                    tracing::warn!("cannot open log file {}: {err}", path.display());
                    return;
                }
            }
        }
        if let Some(file) = files.get_mut(project) {
            if let Err(err) = file.write_all(line.as_bytes()) {
                tracing::warn!("cannot write log for {project}: {err}");
            }
        }
    }
}

/// Delivers every line to each child sink, in order.
#[derive(Clone, Default)]
pub struct FanOutSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

impl LogSink for FanOutSink {
    fn write_line(&self, project: &ProjectName, level: LogLevel, message: &str) {
        for sink in &self.sinks {
            sink.write_line(project, level, message);
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectLogger
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ProjectLogger {
    project: ProjectName,
    sink: Arc<dyn LogSink>,
}

impl ProjectLogger {
    pub fn new(project: ProjectName, sink: Arc<dyn LogSink>) -> Self {
        Self { project, sink }
    }

    pub fn banner(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Banner, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    /// Multi-line output (command stdout/stderr) is split so each line is
    /// delivered whole.
    fn log(&self, level: LogLevel, message: &str) {
        for line in message.lines() {
            self.sink.write_line(&self.project, level, line);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
