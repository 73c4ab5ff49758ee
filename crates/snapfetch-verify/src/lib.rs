//! Checksum primitives for downloaded files.
//!
//! Provides incremental hashing under a named algorithm and a directory
//! scanner that produces a (filepath, filename, checksum) table for every
//! file under a root.
//!
//! # Example
//!
//! ```
//! use snapfetch_verify::{ChecksumAlgorithm, Hasher};
//!
//! let mut hasher = ChecksumAlgorithm::Md5.hasher();
//! hasher.update(b"hello world");
//! assert_eq!(hasher.finalize_hex(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
//! ```

pub use self::algorithm::{ChecksumAlgorithm, UnknownAlgorithm};
pub use self::error::{Result, ScanError};
pub use self::hasher::{AlgorithmHasher, Hasher, hash_file};
pub use self::scanner::{ChecksumScanner, DirectoryScanner};
pub use self::table::{ChecksumEntry, ChecksumTable};

mod algorithm;
mod error;
mod hasher;
mod scanner;
mod table;
