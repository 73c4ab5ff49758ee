//! Post-download reconciliation.
//!
//! Scans the output directory, compares the file count with the manifest's
//! candidates and, when the manifest carries expected checksums, joins the
//! two sides to find rows that are absent or do not match byte for byte.
//! The two cases are indistinguishable from the join alone.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use csv::StringRecord;
use snapfetch_verify::{ChecksumAlgorithm, ChecksumScanner, ChecksumTable};

use crate::error::{Error, Result};
use crate::log::AttemptRecord;
use crate::manifest::Manifest;

/// How manifest rows are matched against scanned files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinKey {
    /// File name and checksum must both match.
    #[default]
    FilenameAndChecksum,
    /// Any file with the expected checksum satisfies the row.
    ChecksumOnly,
}

/// A manifest row with an expected checksum and no matching file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRow {
    pub index:             usize,
    pub image_name:        String,
    pub expected_checksum: String,
    /// Last status written to the download logs for this row, if any.
    pub last_status:       Option<String>,
    pub record:            StringRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub checked: usize,
    pub missing: Vec<MissingRow>,
}

#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    pub expected_count: usize,
    pub actual_count:   usize,
    pub table:          ChecksumTable,
    /// `None` when the manifest has no verifier column.
    pub verification:   Option<Verification>,
}

impl ReconciliationReport {
    pub fn counts_match(&self) -> bool { self.expected_count == self.actual_count }

    pub fn missing_count(&self) -> usize { self.verification.as_ref().map_or(0, |v| v.missing.len()) }
}

pub struct Reconciler<S: ChecksumScanner> {
    scanner:   S,
    algorithm: ChecksumAlgorithm,
    join_key:  JoinKey,
}

impl<S: ChecksumScanner> Reconciler<S> {
    pub fn new(scanner: S, algorithm: ChecksumAlgorithm) -> Self {
        Self {
            scanner,
            algorithm,
            join_key: JoinKey::default(),
        }
    }

    #[must_use]
    pub fn join_key(mut self, join_key: JoinKey) -> Self {
        self.join_key = join_key;
        self
    }

    /// Scan `root` and reconcile it against `manifest`.
    ///
    /// A scan failure aborts the whole step; nothing is partially reported.
    pub fn reconcile(
        &self,
        root: &Path,
        manifest: &Manifest,
        logged: &HashMap<usize, AttemptRecord>,
    ) -> Result<ReconciliationReport> {
        let table = self.scanner.scan(root, self.algorithm)?;
        let expected_count = manifest.expected_count();
        let actual_count = table.len();

        if expected_count == actual_count {
            tracing::info!(expected_count, actual_count, "file count matches manifest");
        } else {
            tracing::warn!(expected_count, actual_count, "file count differs from manifest");
        }

        let verification = manifest
            .has_verifier()
            .then(|| self.verify(&table, manifest, logged));

        Ok(ReconciliationReport {
            expected_count,
            actual_count,
            table,
            verification,
        })
    }

    fn verify(&self, table: &ChecksumTable, manifest: &Manifest, logged: &HashMap<usize, AttemptRecord>) -> Verification {
        let by_name: HashSet<(&str, String)> = table
            .entries()
            .iter()
            .map(|e| (e.filename.as_str(), normalize(&e.checksum)))
            .collect();
        let by_checksum: HashSet<String> = table.entries().iter().map(|e| normalize(&e.checksum)).collect();

        let mut verification = Verification::default();
        for row in manifest.rows() {
            let Some(expected) = row.expected_checksum.as_deref() else {
                continue;
            };
            verification.checked += 1;

            let wanted = normalize(expected);
            let found = match self.join_key {
                JoinKey::FilenameAndChecksum => by_name.contains(&(row.image_name.as_str(), wanted)),
                JoinKey::ChecksumOnly => by_checksum.contains(&wanted),
            };
            if !found {
                verification.missing.push(MissingRow {
                    index:             row.index,
                    image_name:        row.image_name.clone(),
                    expected_checksum: expected.to_string(),
                    last_status:       logged.get(&row.index).map(|r| r.response_status.clone()),
                    record:            row.record.clone(),
                });
            }
        }

        if verification.missing.is_empty() {
            tracing::info!(checked = verification.checked, "all checksums verified");
        } else {
            tracing::warn!(
                checked = verification.checked,
                missing = verification.missing.len(),
                "rows missing or not matching their checksum"
            );
        }
        verification
    }
}

fn normalize(checksum: &str) -> String { checksum.trim().to_lowercase() }

/// Write the full original rows of `missing` under the manifest's header.
pub fn write_missing_csv(path: &Path, headers: &StringRecord, missing: &[MissingRow]) -> Result<()> {
    let report_err = |source: csv::Error| Error::ReportWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(report_err)?;
    writer.write_record(headers).map_err(report_err)?;
    for row in missing {
        writer.write_record(&row.record).map_err(report_err)?;
    }
    writer
        .flush()
        .map_err(|e| report_err(csv::Error::from(e)))
}
