//! Manifest loading and validation.
//!
//! A manifest is a CSV file with a header row. Validation resolves the
//! configured columns, rejects duplicate names and unsafe paths, and yields
//! the named rows in file order. Rows without a name are dropped here and
//! never seen again.

mod columns;
mod names;

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use csv::StringRecord;

pub use self::columns::{ColumnMap, ColumnSpec};
use crate::error::{ConfigError, Error, Result};

/// One named manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    /// Zero-based position among the manifest's data rows.
    pub index:             usize,
    /// Written verbatim as the target's file name.
    pub image_name:        String,
    pub url:               Option<String>,
    pub subfolder:         Option<String>,
    pub expected_checksum: Option<String>,
    /// The row exactly as read, for reports.
    pub record:            StringRecord,
}

impl ManifestRow {
    /// Path of the target relative to the output root.
    pub fn relative_target(&self) -> PathBuf {
        match &self.subfolder {
            Some(sub) => Path::new(sub).join(&self.image_name),
            None => PathBuf::from(&self.image_name),
        }
    }

    pub fn is_candidate(&self) -> bool { self.url.is_some() }
}

/// A validated manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    headers:          StringRecord,
    columns:          ColumnMap,
    rows:             Vec<ManifestRow>,
    total_rows:       usize,
    unnamed_with_url: usize,
}

impl Manifest {
    /// Read and validate the manifest at `path`.
    pub fn load(path: impl AsRef<Path>, spec: &ColumnSpec) -> Result<Self> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(ConfigError::NotCsv(path.to_path_buf()).into());
        }

        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| Error::ManifestRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader, spec, path)
    }

    /// Validate a manifest from any reader.
    pub fn from_reader(reader: impl io::Read, spec: &ColumnSpec) -> Result<Self> {
        Self::from_csv(csv::ReaderBuilder::new().flexible(true).from_reader(reader), spec, Path::new("<reader>"))
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>, spec: &ColumnSpec, origin: &Path) -> Result<Self> {
        let read_err = |source| Error::ManifestRead {
            path: origin.to_path_buf(),
            source,
        };

        let headers = reader.headers().map_err(read_err)?.clone();
        let columns = ColumnMap::resolve(&headers, spec)?;

        let width = headers.len();
        let mut records = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let mut record = record.map_err(read_err)?;
            if record.len() > width {
                tracing::warn!(index, fields = record.len(), width, "dropping cells beyond the header");
                record.truncate(width);
            }
            // Short rows read as trailing nulls.
            while record.len() < width {
                record.push_field("");
            }
            records.push(record);
        }

        check_unique_names(&records, &columns, &spec.name)?;

        let mut rows = Vec::new();
        let mut unnamed_with_url = 0;
        for (index, record) in records.iter().enumerate() {
            let url = cell(record, Some(columns.url));
            let Some(image_name) = cell(record, Some(columns.name)) else {
                if url.is_some() {
                    unnamed_with_url += 1;
                }
                continue;
            };

            if !names::is_plain_file_name(image_name) {
                return Err(ConfigError::UnsafeName {
                    index,
                    name: image_name.to_string(),
                }
                .into());
            }
            let subfolder = cell(record, columns.subfolder);
            if let Some(sub) = subfolder.filter(|s| !names::is_safe_subfolder(s)) {
                return Err(ConfigError::UnsafeSubfolder {
                    index,
                    subfolder: sub.to_string(),
                }
                .into());
            }

            rows.push(ManifestRow {
                index,
                image_name: image_name.to_string(),
                url: url.map(str::to_string),
                subfolder: subfolder.map(str::to_string),
                expected_checksum: cell(record, columns.verifier).map(str::to_string),
                record: record.clone(),
            });
        }

        tracing::debug!(
            rows = records.len(),
            named = rows.len(),
            unnamed_with_url,
            "manifest validated"
        );

        Ok(Self {
            headers,
            columns,
            rows,
            total_rows: records.len(),
            unnamed_with_url,
        })
    }

    pub fn headers(&self) -> &StringRecord { &self.headers }

    pub fn columns(&self) -> &ColumnMap { &self.columns }

    /// Named rows, in manifest order.
    pub fn rows(&self) -> &[ManifestRow] { &self.rows }

    /// Named rows that also carry a URL: the download candidates.
    pub fn candidates(&self) -> impl Iterator<Item = &ManifestRow> { self.rows.iter().filter(|r| r.is_candidate()) }

    /// Number of files a complete run should leave in the output directory.
    pub fn expected_count(&self) -> usize { self.candidates().count() }

    pub fn named_count(&self) -> usize { self.rows.len() }

    pub fn total_rows(&self) -> usize { self.total_rows }

    /// Rows carrying a URL but no name; they will be ignored.
    pub fn unnamed_with_url(&self) -> usize { self.unnamed_with_url }

    pub fn has_verifier(&self) -> bool { self.columns.verifier.is_some() }
}

/// A cell, or `None` when the column is unset or the value is blank.
fn cell(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|i| record.get(i))
        .filter(|value| !value.trim().is_empty())
}

fn check_unique_names(records: &[StringRecord], columns: &ColumnMap, column: &str) -> std::result::Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for record in records {
        if let Some(name) = cell(record, Some(columns.name)) {
            if !seen.insert(name) {
                duplicates.insert(name);
            }
        }
    }

    if duplicates.is_empty() {
        return Ok(());
    }
    Err(ConfigError::DuplicateNames {
        column:     column.to_string(),
        duplicates: duplicates.into_iter().map(str::to_string).collect(),
    })
}
