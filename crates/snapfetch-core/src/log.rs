//! Append-only JSON Lines download logs.
//!
//! Successes and failures go to separate files. Each record is written and
//! flushed as soon as its row reaches a terminal state, so a killed process
//! leaves every completed row on disk.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Status recorded for rows that carry no URL.
pub const NO_URL_STATUS: &str = "no url";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// One terminal outcome for one manifest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub index:           usize,
    pub image:           String,
    /// `null` when the row had no URL.
    pub file_url:        Option<String>,
    pub outcome:         Outcome,
    /// Kept as text: an HTTP code, a transport/write error, or [`NO_URL_STATUS`].
    pub response_status: String,
    pub attempts:        u32,
    pub timestamp:       DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(index: usize, image: impl Into<String>, file_url: Option<String>, outcome: Outcome, response_status: impl Into<String>) -> Self {
        Self {
            index,
            image: image.into(),
            file_url,
            outcome,
            response_status: response_status.into(),
            attempts: 0,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// The success and error log files of one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub success: PathBuf,
    pub error:   PathBuf,
}

/// Single-writer appender for both logs.
///
/// Files are opened lazily in append mode, so history from earlier runs is
/// preserved and a run with no failures never creates an error log.
#[derive(Debug)]
pub struct DownloadLog {
    paths:   LogPaths,
    success: Option<File>,
    error:   Option<File>,
}

impl DownloadLog {
    pub fn new(paths: LogPaths) -> Self {
        Self {
            paths,
            success: None,
            error: None,
        }
    }

    pub fn paths(&self) -> &LogPaths { &self.paths }

    pub fn append(&mut self, record: &AttemptRecord) -> Result<()> {
        let (slot, path) = match record.outcome {
            Outcome::Success => (&mut self.success, &self.paths.success),
            Outcome::Error => (&mut self.error, &self.paths.error),
        };
        let write_err = |source: std::io::Error| Error::LogWrite {
            path: path.clone(),
            source,
        };

        let file = match slot {
            Some(file) => file,
            None => slot.insert(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(write_err)?,
            ),
        };

        let mut line = serde_json::to_vec(record).map_err(|e| write_err(e.into()))?;
        line.push(b'\n');
        file.write_all(&line).map_err(write_err)?;
        file.flush().map_err(write_err)
    }
}

/// Latest record per row index across both logs.
///
/// Missing files are treated as empty. Lines that do not parse, such as a
/// line truncated by a killed process, are skipped with a warning.
pub fn read_last_records(paths: &LogPaths) -> Result<HashMap<usize, AttemptRecord>> {
    let mut latest: HashMap<usize, AttemptRecord> = HashMap::new();
    for path in [&paths.success, &paths.error] {
        for record in read_records(path)? {
            let newer = latest
                .get(&record.index)
                .is_none_or(|seen| seen.timestamp <= record.timestamp);
            if newer {
                latest.insert(record.index, record);
            }
        }
    }
    Ok(latest)
}

fn read_records(path: &Path) -> Result<Vec<AttemptRecord>> {
    let read_err = |source: std::io::Error| Error::LogRead {
        path: path.to_path_buf(),
        source,
    };
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_err(e)),
    };

    let mut records = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(read_err)?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AttemptRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(path = %path.display(), line = number + 1, error = %e, "skipping unreadable log line"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(dir: &Path) -> LogPaths {
        LogPaths {
            success: dir.join("m_log.jsonl"),
            error:   dir.join("m_error_log.jsonl"),
        }
    }

    #[test]
    fn test_records_route_by_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = DownloadLog::new(paths(dir.path()));

        log.append(&AttemptRecord::new(0, "a.jpg", Some("http://x/a".into()), Outcome::Success, "200").attempts(1))
            .unwrap();
        log.append(&AttemptRecord::new(1, "b.jpg", None, Outcome::Error, NO_URL_STATUS))
            .unwrap();

        let success = std::fs::read_to_string(dir.path().join("m_log.jsonl")).unwrap();
        let error = std::fs::read_to_string(dir.path().join("m_error_log.jsonl")).unwrap();
        assert_eq!(success.lines().count(), 1);
        assert_eq!(error.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(error.trim()).unwrap();
        assert_eq!(value["outcome"], "error");
        assert_eq!(value["response_status"], "no url");
        assert!(value["file_url"].is_null());

        let value: serde_json::Value = serde_json::from_str(success.trim()).unwrap();
        assert_eq!(value["response_status"], "200");
    }

    #[test]
    fn test_no_error_log_without_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = DownloadLog::new(paths(dir.path()));
        log.append(&AttemptRecord::new(0, "a.jpg", Some("u".into()), Outcome::Success, "200"))
            .unwrap();
        assert!(!dir.path().join("m_error_log.jsonl").exists());
    }

    #[test]
    fn test_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..2 {
            let mut log = DownloadLog::new(paths(dir.path()));
            log.append(&AttemptRecord::new(0, "a.jpg", Some("u".into()), Outcome::Error, "503"))
                .unwrap();
        }
        let text = std::fs::read_to_string(dir.path().join("m_error_log.jsonl")).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_last_record_wins_and_truncated_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let mut log = DownloadLog::new(paths.clone());

        let mut failed = AttemptRecord::new(0, "a.jpg", Some("u".into()), Outcome::Error, "503");
        failed.timestamp = Utc::now() - chrono::Duration::seconds(60);
        log.append(&failed).unwrap();
        log.append(&AttemptRecord::new(0, "a.jpg", Some("u".into()), Outcome::Success, "200"))
            .unwrap();
        log.append(&AttemptRecord::new(2, "c.jpg", Some("u".into()), Outcome::Error, "404"))
            .unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&paths.error)
            .unwrap()
            .write_all(b"{\"index\": 3, \"ima")
            .unwrap();

        let latest = read_last_records(&paths).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[&0].response_status, "200");
        assert_eq!(latest[&2].response_status, "404");
    }

    #[test]
    fn test_missing_logs_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_last_records(&paths(dir.path())).unwrap().is_empty());
    }
}
