//! Immutable data types for fetching.
//!
//! Retry policy is configuration; outcomes are values returned to the
//! caller. Neither carries behaviour beyond formatting.

pub mod options;
pub mod outcome;

pub use options::RetryPolicy;
pub use outcome::{Failure, FetchOutcome, FetchReport};
