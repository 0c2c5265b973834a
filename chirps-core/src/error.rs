/// Error types for CHIRPS queries
use thiserror::Error;

/// Invalid user input, detected before anything is sent to the remote service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),

    #[error("invalid month-day {0:?}: expected MM-DD")]
    MonthDay(String),

    /// The season window would be inverted for every year
    #[error("season window {start} -> {end} is empty or crosses a year boundary")]
    InvalidWindow { start: String, end: String },

    #[error("year range {first}..={last} is invalid: {reason}")]
    YearRange { first: i32, last: i32, reason: String },

    #[error("threshold {name} must be finite, got {value}")]
    Threshold { name: &'static str, value: f64 },
}

/// Failure of a single remote aggregation request
#[derive(Error, Debug)]
pub enum QueryError {
    /// HTTP transport failed (connect, timeout, body read)
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials were rejected or have expired
    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Failed to decode the service response
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl QueryError {
    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            #[cfg(feature = "api")]
            QueryError::Http(_) => true,
            QueryError::Unauthorized(_) | QueryError::Decode(_) => false,
            QueryError::Quota(_) | QueryError::Unavailable(_) => true,
            QueryError::Status { status, .. } => *status >= 500,
        }
    }
}

/// Failure to establish a session with the remote service
#[derive(Error, Debug)]
pub enum InitError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("credential {0} contains characters not allowed in a header")]
    InvalidCredential(&'static str),

    #[error("invalid base url {0:?}")]
    BaseUrl(String),

    #[cfg(feature = "api")]
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::QueryError;

    #[test]
    fn test_retryable() {
        assert!(QueryError::Unavailable("down".into()).is_retryable());
        assert!(QueryError::Quota("slow down".into()).is_retryable());
        assert!(QueryError::Status { status: 503, message: String::new() }.is_retryable());
        assert!(!QueryError::Status { status: 400, message: String::new() }.is_retryable());
        assert!(!QueryError::Unauthorized("expired".into()).is_retryable());
        assert!(!QueryError::Decode("junk".into()).is_retryable());
    }
}
