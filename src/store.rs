use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Wall-clock format written into count rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header line of the counts file.
pub const CSV_HEADER: &str = "Timestamp,Car Count";

/// One completed sample: local wall-clock time plus the vehicle count.
#[derive(Clone, Debug, PartialEq)]
pub struct CountRecord {
    pub taken_at: DateTime<Local>,
    pub count: u32,
}

impl CountRecord {
    /// Stamp a count with the current local time.
    pub fn now(count: u32) -> Self {
        Self {
            taken_at: Local::now(),
            count,
        }
    }

    pub fn timestamp(&self) -> String {
        self.taken_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

pub trait CountStore: Send {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Prepare the store for appends.
    ///
    /// Idempotent; an existing store is left untouched, history included.
    fn ensure_initialized(&mut self) -> Result<()>;

    /// Persist one record. Each call is flushed independently so a crash
    /// between samples loses at most the in-flight row.
    fn append(&mut self, record: &CountRecord) -> Result<()>;
}

/// Append-only CSV file, one row per sample.
pub struct CsvCountStore {
    path: PathBuf,
}

impl CsvCountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CountStore for CsvCountStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory {}", parent.display())
                })?;
            }
        }

        let mut file = File::create(&self.path)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        writeln!(file, "{}", CSV_HEADER)
            .with_context(|| format!("failed to write header to {}", self.path.display()))?;
        Ok(())
    }

    fn append(&mut self, record: &CountRecord) -> Result<()> {
        // create(true) keeps appends working if the file vanishes mid-run;
        // the recreated file simply lacks a header.
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {} for append", self.path.display()))?;
        writeln!(file, "{},{}", record.timestamp(), record.count)
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests and one-shot runs.
#[derive(Default)]
pub struct InMemoryCountStore {
    records: Vec<CountRecord>,
}

impl InMemoryCountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CountRecord] {
        &self.records
    }
}

impl CountStore for InMemoryCountStore {
    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        Ok(())
    }

    fn append(&mut self, record: &CountRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
