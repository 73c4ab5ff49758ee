use std::path::{Path, PathBuf};

use crate::algorithm::ChecksumAlgorithm;
use crate::error::{Result, ScanError};

const FILEPATH_COLUMN: &str = "filepath";
const FILENAME_COLUMN: &str = "filename";

/// One file found by a scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    pub filepath: PathBuf,
    pub filename: String,
    pub checksum: String,
}

/// Checksums for every file under a scanned root, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumTable {
    algorithm: ChecksumAlgorithm,
    entries:   Vec<ChecksumEntry>,
}

impl ChecksumTable {
    pub fn new(algorithm: ChecksumAlgorithm, entries: Vec<ChecksumEntry>) -> Self {
        Self { algorithm, entries }
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm { self.algorithm }

    pub fn entries(&self) -> &[ChecksumEntry] { &self.entries }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Writes `filepath,filename,<algorithm>` rows to `path`.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let csv_err = |source| ScanError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        writer
            .write_record([FILEPATH_COLUMN, FILENAME_COLUMN, self.algorithm.name()])
            .map_err(csv_err)?;
        for entry in &self.entries {
            let filepath = entry.filepath.to_string_lossy();
            writer
                .write_record([filepath.as_ref(), entry.filename.as_str(), entry.checksum.as_str()])
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|e| csv_err(e.into()))?;
        Ok(())
    }

    /// Reads a table previously written by [`ChecksumTable::write_csv`].
    pub fn read_csv(path: impl AsRef<Path>, algorithm: ChecksumAlgorithm) -> Result<Self> {
        let path = path.as_ref();
        let csv_err = |source| ScanError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
        let headers = reader.headers().map_err(csv_err)?.clone();
        let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let missing = |name: &str| ScanError::MissingColumn {
            path:      path.to_path_buf(),
            algorithm: name.to_string(),
        };

        let filepath_idx = position(FILEPATH_COLUMN).ok_or_else(|| missing(FILEPATH_COLUMN))?;
        let filename_idx = position(FILENAME_COLUMN).ok_or_else(|| missing(FILENAME_COLUMN))?;
        let checksum_idx = position(algorithm.name()).ok_or_else(|| missing(algorithm.name()))?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
            entries.push(ChecksumEntry {
                filepath: PathBuf::from(field(filepath_idx)),
                filename: field(filename_idx),
                checksum: field(checksum_idx),
            });
        }

        Ok(Self { algorithm, entries })
    }
}
