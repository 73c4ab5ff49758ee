//! Error types for snapfetch-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the retry loop: client construction and local
/// staging I/O. Per-row outcomes are reported as [`crate::FetchOutcome`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[cfg(feature = "reqwest")]
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {from} into place at {to}: {source}")]
    Commit {
        from:   PathBuf,
        to:     PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("destination {0} has no file name")]
    InvalidDestination(PathBuf),
}

pub type Result<T> = std::result::Result<T, FetchError>;
