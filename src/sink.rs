//! Transcript sinks.
//!
//! A sink receives finalized transcript segments in receipt order. Sink
//! failures are reported by the session but never stop the stream: losing
//! one segment is acceptable degraded behavior.

use crate::error::{RelayError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Pluggable destination for finalized transcript segments.
pub trait TranscriptSink: Send {
    /// Appends one finalized segment (already trimmed, non-empty).
    fn append(&mut self, text: &str) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Appends segments as lines to a file.
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// Opens the output file for appending, optionally truncating any
    /// previous transcript first.
    pub fn open(path: &Path, truncate: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(!truncate)
            .truncate(truncate)
            .write(true)
            .open(path)
            .map_err(|e| RelayError::SinkWrite {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }
}

impl TranscriptSink for FileSink {
    fn append(&mut self, text: &str) -> Result<()> {
        writeln!(self.file, "{}", text).map_err(|e| RelayError::SinkWrite {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Writes segments to stdout, one per line. Used when the output path is `-`.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl TranscriptSink for StdoutSink {
    fn append(&mut self, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Collects segments in memory. Used by tests.
#[derive(Debug, Default, Clone)]
pub struct CollectorSink {
    segments: Arc<Mutex<Vec<String>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn collected(&self) -> Vec<String> {
        self.segments
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl TranscriptSink for CollectorSink {
    fn append(&mut self, text: &str) -> Result<()> {
        if let Ok(mut segments) = self.segments.lock() {
            segments.push(text.to_string());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
