//! Human-readable run log (`agent.log` by default).
//!
//! Every record is one `[YYYY-MM-DD HH:MM:SS] message` entry, appended in
//! emission order. Records are also kept in memory so callers and tests can
//! inspect them without reading the file back. A failed write is reported via
//! tracing and never interrupts the step sequence.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use tracing::warn;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One timestamped log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl LogRecord {
    pub fn render(&self) -> String {
        format!("[{}] {}", self.timestamp.format(TIMESTAMP_FORMAT), self.message)
    }
}

/// Append-only run log.
#[derive(Debug, Default)]
pub struct RunLog {
    sink: Option<PathBuf>,
    records: Vec<LogRecord>,
    echo: bool,
}

impl RunLog {
    /// Log that appends to `path`, creating it (and its parent) on first write.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: Some(path.into()),
            ..Self::default()
        }
    }

    /// Log that only keeps records in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Also print each rendered record to stderr.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn record(&mut self, message: impl Into<String>) {
        let record = LogRecord {
            timestamp: Local::now().naive_local(),
            message: message.into(),
        };
        let line = record.render();

        if let Some(path) = &self.sink
            && let Err(err) = append_line(path, &line)
        {
            warn!(path = %path.display(), err = %format!("{err:#}"), "failed to write run log");
        }
        if self.echo {
            eprintln!("{line}");
        }
        self.records.push(record);
    }

    /// Messages without timestamps, in emission order.
    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.message.as_str()).collect()
    }
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("append {}", path.display()))?;
    Ok(())
}
