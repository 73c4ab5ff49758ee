//! Sequential HTTP fetching with bounded retry and staged placement.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable policy and outcome types
//! - [`core`] - Pure transformations: status classification and the
//!   per-attempt state machine
//! - [`effects`] - I/O operations behind the [`HttpClient`] and [`Pause`] traits
//!
//! One request is in flight at a time. A body is streamed into a hidden
//! staging file next to its destination and renamed into place only once
//! the whole body has arrived, so an interrupted transfer never leaves a
//! partial file under the destination name.

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use self::core::{AttemptEvent, AttemptState, RETRYABLE_STATUSES, StatusClass, classify_status};
pub use self::data::{Failure, FetchOutcome, FetchReport, RetryPolicy};
pub use self::effects::{BoxStream, Fetcher, HttpClient, Pause, Response, TokioPause, is_staging_name, staging_path};

#[cfg(feature = "reqwest")]
pub use self::effects::ReqwestClient;

pub use self::error::{FetchError, Result};
