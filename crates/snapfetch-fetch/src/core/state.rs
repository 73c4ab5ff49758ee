use crate::core::retry::{StatusClass, classify_status};
use crate::data::{Failure, FetchOutcome, FetchReport, RetryPolicy};

/// Per-row download state.
///
/// ```text
/// Pending ──Start──▶ Requesting ──Delivered──▶ Succeeded
///                      │   ▲
///   transient failure, │   │ WaitElapsed
///   budget remaining   ▼   │
///                     RetryWait
///
/// Requesting ──terminal failure / budget spent──▶ Failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Requesting { attempt: u32 },
    RetryWait { attempt: u32, last: Failure },
    Succeeded { attempts: u32, status: u16, bytes: u64 },
    Failed { attempts: u32, failure: Failure },
}

/// Observations fed into [`AttemptState::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Start,
    /// 2xx response whose body is now in place.
    Delivered { status: u16, bytes: u64 },
    /// Non-success response; the body was discarded.
    Status(u16),
    /// No response, or the body stream broke mid-transfer.
    Transport(String),
    /// Local disk failure while placing the body.
    WriteFailed(String),
    WaitElapsed,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Succeeded { .. } | AttemptState::Failed { .. })
    }

    /// Apply one event. Events that do not fit the current state leave it
    /// unchanged.
    pub fn advance(self, event: AttemptEvent, policy: &RetryPolicy) -> AttemptState {
        match (self, event) {
            (AttemptState::Pending, AttemptEvent::Start) => AttemptState::Requesting { attempt: 1 },

            (AttemptState::Requesting { attempt }, AttemptEvent::Delivered { status, bytes }) => {
                AttemptState::Succeeded {
                    attempts: attempt,
                    status,
                    bytes,
                }
            }

            (AttemptState::Requesting { attempt }, AttemptEvent::Status(status)) => {
                match classify_status(status) {
                    StatusClass::Transient => retry_or_fail(attempt, Failure::Status(status), policy),
                    StatusClass::Success | StatusClass::Terminal => AttemptState::Failed {
                        attempts: attempt,
                        failure:  Failure::Status(status),
                    },
                }
            }

            (AttemptState::Requesting { attempt }, AttemptEvent::Transport(message)) => {
                retry_or_fail(attempt, Failure::Transport(message), policy)
            }

            (AttemptState::Requesting { attempt }, AttemptEvent::WriteFailed(message)) => {
                AttemptState::Failed {
                    attempts: attempt,
                    failure:  Failure::Write(message),
                }
            }

            (AttemptState::RetryWait { attempt, .. }, AttemptEvent::WaitElapsed) => {
                AttemptState::Requesting {
                    attempt: attempt + 1,
                }
            }

            (state, _) => state,
        }
    }

    /// The report for a terminal state; an in-flight state is handed back.
    pub fn into_report(self) -> Result<FetchReport, AttemptState> {
        match self {
            AttemptState::Succeeded {
                attempts,
                status,
                bytes,
            } => Ok(FetchReport {
                attempts,
                outcome: FetchOutcome::Delivered { status, bytes },
            }),
            AttemptState::Failed { attempts, failure } => Ok(FetchReport {
                attempts,
                outcome: FetchOutcome::Failed(failure),
            }),
            in_flight => Err(in_flight),
        }
    }
}

fn retry_or_fail(attempt: u32, failure: Failure, policy: &RetryPolicy) -> AttemptState {
    if policy.allows_another(attempt) {
        AttemptState::RetryWait {
            attempt,
            last: failure,
        }
    } else {
        AttemptState::Failed {
            attempts: attempt,
            failure,
        }
    }
}
