//! Append-only activity log shared by all in-flight requests.
//!
//! One CSV-quoted row per request: timestamp, prompt, generated content
//! (sections joined by a blank line). The row is built up front and
//! written with a single `write_all` under a held lock, so concurrent
//! requests cannot interleave partial rows. The log is write-once and
//! never read back by the service.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;

use crate::models::LogRecord;

pub struct ActivityLogger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ActivityLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Append one row. Callers treat the log as best-effort: an `Err` here
    /// must be downgraded to a warning, never surfaced as a request
    /// failure.
    pub fn append(&self, prompt: &str, sections: &[String]) -> io::Result<()> {
        let record = LogRecord {
            timestamp: Local::now().to_rfc3339(),
            prompt: prompt.to_string(),
            content: sections.join("\n\n"),
        };

        let row = format!(
            "{},{},{}\n",
            csv_field(&record.timestamp),
            csv_field(&record.prompt),
            csv_field(&record.content),
        );

        let guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(row.as_bytes())?;
        drop(guard);

        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
