use thiserror::Error;

/// Failure of a completion call.
///
/// Every variant is recoverable at the session loop: the turn is reported
/// and the transcript stays as it was.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("provider rejected the API key: {0}")]
    Unauthorized(String),

    #[error("provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response format: {0}")]
    MalformedResponse(String),

    #[error("empty response from provider")]
    EmptyResponse,
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message),
            429 => Self::QuotaExceeded(message),
            _ => Self::Status { status, message },
        }
    }
}
