use std::path::Path;

use snapfetch_fetch::is_staging_name;
use walkdir::WalkDir;

use crate::algorithm::ChecksumAlgorithm;
use crate::error::{Result, ScanError};
use crate::hasher::hash_file;
use crate::table::{ChecksumEntry, ChecksumTable};

/// Capability: compute a checksum for every file in a directory tree.
pub trait ChecksumScanner {
    fn scan(&self, root: &Path, algorithm: ChecksumAlgorithm) -> Result<ChecksumTable>;
}

/// Walks a directory tree on the local filesystem in file-name order.
///
/// Every regular file counts, dot-prefixed ones included, except staging
/// files (`.name.part`) left behind by an interrupted download.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryScanner;

impl DirectoryScanner {
    pub fn new() -> Self { Self }
}

impl ChecksumScanner for DirectoryScanner {
    fn scan(&self, root: &Path, algorithm: ChecksumAlgorithm) -> Result<ChecksumTable> {
        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(root).sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() || is_staging_name(entry.file_name()) {
                continue;
            }

            let path = entry.path();
            let checksum = hash_file(path, algorithm).map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            entries.push(ChecksumEntry {
                filepath: path.to_path_buf(),
                filename: entry.file_name().to_string_lossy().into_owned(),
                checksum,
            });
        }

        tracing::debug!(root = %root.display(), files = entries.len(), %algorithm, "scanned directory");
        Ok(ChecksumTable::new(algorithm, entries))
    }
}
