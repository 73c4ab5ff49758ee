use std::io;
use std::path::PathBuf;

/// Failure to produce or persist a checksum table.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot scan {path}: not a readable directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path:   PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("checksum table {path}: {source}")]
    Csv {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("checksum table {path} has no column for {algorithm}")]
    MissingColumn { path: PathBuf, algorithm: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
