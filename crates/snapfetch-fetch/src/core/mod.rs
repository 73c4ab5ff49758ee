//! Pure transformations for fetching.
//!
//! Nothing here performs I/O: status classification and the attempt state
//! machine are plain functions over values, so the retry budget and the
//! terminal states can be tested without a network or a clock.

mod retry;
mod state;

pub use retry::{RETRYABLE_STATUSES, StatusClass, classify_status};
pub use state::{AttemptEvent, AttemptState};
