use popcorn_sources::SourceError;
use thiserror::Error;

/// User-visible outcome of a failed fetch.
///
/// Cancellation is not an error: a superseded request never settles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Non-2xx response, or no usable response at all
    #[error("Something went wrong!")]
    Transport,
    /// 2xx response that explicitly reports no match
    #[error("Movie not found!")]
    NotFound,
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport => "TransportError",
            FetchError::NotFound => "NotFoundError",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<&SourceError> for FetchError {
    fn from(err: &SourceError) -> Self {
        if err.is_not_found() {
            FetchError::NotFound
        } else {
            FetchError::Transport
        }
    }
}
