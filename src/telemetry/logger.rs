//! # Status Logger
//!
//! Appends decoded robot status to JSONL files, one record per line, with
//! size-based rotation and a retention cap. File names carry a
//! monotonically increasing index so a restarted driver station never
//! overwrites an earlier log.

use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::proto::protocol::RobotState;

const FILE_PREFIX: &str = "telemetry_";
const FILE_SUFFIX: &str = ".jsonl";

/// One logged line: a local timestamp plus the full status snapshot.
#[derive(Serialize)]
struct StatusRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    status: &'a RobotState,
}

/// Rotating JSONL writer for robot status records.
pub struct StatusLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    next_index: u64,
}

impl std::fmt::Debug for StatusLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusLogger")
            .field("dir", &self.dir)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl StatusLogger {
    /// Create the log directory and position the file index after any
    /// logs left by a previous run.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&dir)?;
        let next_index = match highest_index(&dir)? {
            Some(index) => index + 1,
            None => 0,
        };
        Ok(Self {
            dir,
            max_records_per_file: config.max_records_per_file,
            max_files_to_keep: config.max_files_to_keep,
            writer: None,
            records_in_file: 0,
            next_index,
        })
    }

    /// Append one status record, rotating first when the current file is
    /// full (or none is open yet).
    pub fn log(&mut self, status: &RobotState) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = StatusRecord {
            timestamp: Local::now().to_rfc3339(),
            status,
        };
        let line = serde_json::to_string(&record)?;
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{line}")?;
            writer.flush()?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    /// Open the next log file and drop the oldest beyond the retention cap.
    fn rotate(&mut self) -> Result<()> {
        self.writer = None;
        let path = self
            .dir
            .join(format!("{FILE_PREFIX}{:05}{FILE_SUFFIX}", self.next_index));
        debug!("rotating telemetry log to {}", path.display());
        self.writer = Some(BufWriter::new(File::create(&path)?));
        self.records_in_file = 0;
        self.next_index += 1;
        self.prune()?;
        Ok(())
    }

    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.dir)?;
        files.sort();
        let excess = files.len().saturating_sub(self.max_files_to_keep);
        for stale in &files[..excess] {
            debug!("pruning telemetry log {}", stale.display());
            fs::remove_file(stale)?;
        }
        Ok(())
    }
}

/// All telemetry log files in `dir`.
fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Highest file index already present in `dir`, if any.
fn highest_index(dir: &Path) -> Result<Option<u64>> {
    let mut highest = None;
    for path in log_files(dir)? {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        let digits = &name[FILE_PREFIX.len()..name.len() - FILE_SUFFIX.len()];
        if let Ok(index) = digits.parse::<u64>() {
            highest = Some(highest.map_or(index, |h: u64| h.max(index)));
        }
    }
    Ok(highest)
}
