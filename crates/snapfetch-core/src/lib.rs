//! Batch image acquisition from a CSV manifest.
//!
//! A run validates the manifest, downloads every named row that has a URL
//! one at a time with bounded retry, optionally writes downsized copies, and
//! finally reconciles the output directory against the manifest by count
//! and, if the manifest carries them, by checksum.
//!
//! # Example
//!
//! ```no_run
//! use snapfetch_core::{PreparedRun, RunConfig};
//! use snapfetch_fetch::{ReqwestClient, TokioPause};
//! use snapfetch_verify::DirectoryScanner;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let run = PreparedRun::prepare(RunConfig::new("birds.csv", "images"))?;
//! let client = ReqwestClient::new(Duration::from_secs(120))?;
//! let tally = run.download(client, TokioPause, |_, _| {}).await?;
//! let report = run.reconcile(DirectoryScanner::new())?;
//! println!("{} delivered, {} of {} files present", tally.delivered, report.actual_count, report.expected_count);
//! # Ok(())
//! # }
//! ```

pub use self::downsample::{Downsampled, Downsampler};
pub use self::engine::{DownloadEngine, RowOutcome, RunTally};
pub use self::error::{ConfigError, DownsampleError, Error, Result};
pub use self::existing::{OutputState, inspect_output};
pub use self::layout::OutputLayout;
pub use self::log::{AttemptRecord, DownloadLog, LogPaths, NO_URL_STATUS, Outcome, read_last_records};
pub use self::manifest::{ColumnMap, ColumnSpec, Manifest, ManifestRow};
pub use self::pipeline::{ArtifactPaths, PreparedRun, RunConfig, RunSummary, run};
pub use self::reconcile::{JoinKey, MissingRow, ReconciliationReport, Reconciler, Verification, write_missing_csv};

mod downsample;
mod engine;
mod error;
mod existing;
mod layout;
mod log;
mod manifest;
mod pipeline;
mod reconcile;
