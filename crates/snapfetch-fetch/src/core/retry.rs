/// HTTP statuses worth another request.
///
/// - 429: Too Many Requests
/// - 500: Internal Server Error
/// - 502: Bad Gateway
/// - 503: Service Unavailable
/// - 504: Gateway Timeout
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: the body is the resource.
    Success,
    /// In [`RETRYABLE_STATUSES`]: retry while budget remains.
    Transient,
    /// Anything else: fail now.
    Terminal,
}

/// Classify a response status.
///
/// # Examples
///
/// ```
/// use snapfetch_fetch::{classify_status, StatusClass};
///
/// assert_eq!(classify_status(200), StatusClass::Success);
/// assert_eq!(classify_status(503), StatusClass::Transient);
/// assert_eq!(classify_status(404), StatusClass::Terminal);
/// ```
pub fn classify_status(status: u16) -> StatusClass {
    if (200..300).contains(&status) {
        StatusClass::Success
    } else if RETRYABLE_STATUSES.contains(&status) {
        StatusClass::Transient
    } else {
        StatusClass::Terminal
    }
}
