use std::fmt;

/// Why a row ended without a delivered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Final HTTP status: non-retryable, or retryable with the budget spent.
    Status(u16),
    /// Connection, timeout, or mid-body failure on the last attempt.
    Transport(String),
    /// The body arrived but could not be placed on local disk.
    Write(String),
}

impl Failure {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Failure::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Renders the status text recorded in the download log. HTTP codes are
/// rendered bare (`"404"`); the other causes carry a prefix so they can
/// never be mistaken for a status code.
impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Status(code) => write!(f, "{code}"),
            Failure::Transport(msg) => write!(f, "transport error: {msg}"),
            Failure::Write(msg) => write!(f, "write error: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Delivered { status: u16, bytes: u64 },
    Failed(Failure),
}

impl FetchOutcome {
    pub fn is_delivered(&self) -> bool { matches!(self, FetchOutcome::Delivered { .. }) }

    /// Status text for the log: the HTTP code on success, the failure otherwise.
    pub fn status_text(&self) -> String {
        match self {
            FetchOutcome::Delivered { status, .. } => status.to_string(),
            FetchOutcome::Failed(failure) => failure.to_string(),
        }
    }
}

/// Terminal result for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// Requests issued, including the successful one.
    pub attempts: u32,
    pub outcome:  FetchOutcome,
}
