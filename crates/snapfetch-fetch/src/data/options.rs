use std::time::Duration;

/// Per-row retry budget.
///
/// The budget resets for every row. Waiting happens only between attempts,
/// so a row that fails every time costs `max_attempts` requests and
/// `max_attempts - 1` waits.
///
/// # Examples
///
/// ```
/// use snapfetch_fetch::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .max_attempts(3)
///     .wait(Duration::from_millis(250));
/// assert_eq!(policy.get_max_attempts(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    wait:         Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            wait:         Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, wait: Duration) -> Self {
        Self::default().max_attempts(max_attempts).wait(wait)
    }

    /// Set the total number of requests allowed for one row.
    ///
    /// Values below one are raised to one: every candidate row gets at
    /// least one request.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn get_max_attempts(&self) -> u32 { self.max_attempts }

    pub fn get_wait(&self) -> Duration { self.wait }

    /// Whether another request may follow attempt number `attempt` (1-based).
    pub fn allows_another(&self, attempt: u32) -> bool { attempt < self.max_attempts }
}
