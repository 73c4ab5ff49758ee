//! Error types for snapfetch-core.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Manifest or option problems detected before any network or disk activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input file {0} is not a .csv file")]
    NotCsv(PathBuf),

    #[error("column '{column}' ({role}) not found in manifest; available columns: {available}")]
    MissingColumn {
        role:      &'static str,
        column:    String,
        available: String,
    },

    #[error("column '{column}' must contain unique values; duplicated: {}", .duplicates.join(", "))]
    DuplicateNames {
        column:     String,
        duplicates: Vec<String>,
    },

    #[error("row {index}: image name '{name}' must be a plain file name")]
    UnsafeName { index: usize, name: String },

    #[error("row {index}: subfolder '{subfolder}' must be a relative path without '..'")]
    UnsafeSubfolder { index: usize, subfolder: String },

    #[error(transparent)]
    InvalidAlgorithm(#[from] snapfetch_verify::UnknownAlgorithm),
}

/// A downsized copy could not be produced. Never aborts a batch.
#[derive(Debug, Error)]
pub enum DownsampleError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path:   PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot infer an image format for {0}")]
    UnsupportedFormat(PathBuf),

    #[error("failed to encode {path}: {source}")]
    Encode {
        path:   PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Run-level failures. Row-level download failures are never reported here.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read manifest {path}: {source}")]
    ManifestRead {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write log {path}: {source}")]
    LogWrite {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read log {path}: {source}")]
    LogRead {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    CreateOutput {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to inspect output directory {path}: {source}")]
    Inspect {
        path:   PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("reconciliation aborted: {0}")]
    Reconcile(#[from] snapfetch_verify::ScanError),
}

pub type Result<T> = std::result::Result<T, Error>;
