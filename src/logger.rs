//! Named component loggers
//!
//! Each outbound component owns a [`LogSink`] identified by a logical name
//! (the configuration key holding its file name). [`FileLogger`] appends to
//! `<LOG_DIRECTORY>/<file name>` and mirrors every line into `tracing`;
//! [`MemoryLogger`] keeps records in memory for tests.

use crate::config::ConfigProvider;
use chrono::Utc;
use parking_lot::Mutex;
use relay_shared::keys;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leveled, named log output for a single component
pub trait LogSink: Send + Sync {
    /// Logical logger name
    fn name(&self) -> &str;

    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Appends lines to a log file and mirrors them into `tracing`
pub struct FileLogger {
    name: String,
    path: Option<PathBuf>,
    file: Mutex<Option<File>>,
}

impl FileLogger {
    /// Open (or create) `<directory>/<file_name>` in append mode
    pub fn new(name: impl Into<String>, directory: impl AsRef<Path>, file_name: &str) -> Self {
        let name = name.into();
        let path = directory.as_ref().join(file_name);
        let file = match open_append(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(logger = %name, "Cannot open log file {}: {}", path.display(), e);
                None
            }
        };

        Self {
            name,
            path: Some(path),
            file: Mutex::new(file),
        }
    }

    /// A logger that only writes to `tracing`
    pub fn tracing_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            file: Mutex::new(None),
        }
    }

    /// Resolve the logger from configuration: the directory comes from
    /// `LOG_DIRECTORY`, the file name from the key called `name`.
    ///
    /// Falls back to tracing-only output when either is missing.
    pub fn from_config(name: &str, config: &dyn ConfigProvider) -> Self {
        match (config.get(keys::LOG_DIRECTORY), config.get(name)) {
            (Some(directory), Some(file_name)) => Self::new(name, directory, &file_name),
            _ => {
                debug!(logger = name, "No log file configured, using tracing output only");
                Self::tracing_only(name)
            }
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

impl LogSink for FileLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!(logger = %self.name, "{}", message),
            LogLevel::Info => info!(logger = %self.name, "{}", message),
            LogLevel::Warn => warn!(logger = %self.name, "{}", message),
            LogLevel::Error => error!(logger = %self.name, "{}", message),
        }

        let mut guard = self.file.lock();
        if let Some(file) = guard.as_mut() {
            let line = format!(
                "{} {} {} {}\n",
                Utc::now().to_rfc3339(),
                level,
                self.name,
                message
            );
            if let Err(e) = file.write_all(line.as_bytes()) {
                // Stop writing to a broken file; tracing output continues
                warn!(logger = %self.name, "Log file write failed: {}", e);
                *guard = None;
            }
        }
    }
}

impl fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogger")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

/// One captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub name: String,
    pub level: LogLevel,
    pub message: String,
}

/// Captures log lines in memory
///
/// Clones share the same record buffer, so a test can keep one handle and
/// give another to the component under test.
#[derive(Debug, Clone)]
pub struct MemoryLogger {
    name: String,
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// `(level, message)` pairs in the order they were logged
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.records
            .lock()
            .iter()
            .map(|r| (r.level, r.message.clone()))
            .collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemoryLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            name: self.name.clone(),
            level,
            message: message.to_string(),
        });
    }
}
