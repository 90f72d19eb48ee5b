use thiserror::Error;

/// Failures reported by a [`crate::MovieSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx answer whose payload says nothing matched.
    #[error("No match for '{lookup}': {reason}")]
    NotFound { lookup: String, reason: String },

    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A 2xx answer that could not be decoded.
    #[error("Malformed response: {reason}")]
    Decode { reason: String },
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            SourceError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
