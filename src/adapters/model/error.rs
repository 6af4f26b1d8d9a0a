//! Model API error classification.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the patch-proposal model backend.
///
/// Classification drives retry behavior: rate limits, overload, and server
/// errors are transient; client errors are permanent.
#[derive(Debug, Error)]
pub enum ModelApiError {
    #[error("Rate limited (429): {0}")]
    RateLimited(String),

    #[error("Model backend overloaded (529): {0}")]
    Overloaded(String),

    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Client error ({status}): {body}")]
    ClientError { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ModelApiError {
    /// Map an HTTP status plus body into the right variant.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            429 => Self::RateLimited(body),
            529 => Self::Overloaded(body),
            s if (500..600).contains(&s) => Self::ServerError { status: s, body },
            s => Self::ClientError { status: s, body },
        }
    }

    /// Whether a retry could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Overloaded(_) | Self::ServerError { .. } | Self::Network(_)
        )
    }
}

impl From<reqwest::Error> for ModelApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let err = ModelApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(err, ModelApiError::RateLimited(_)));
        assert!(err.is_transient());

        let err = ModelApiError::from_status(StatusCode::BAD_GATEWAY, String::new());
        assert!(matches!(err, ModelApiError::ServerError { status: 502, .. }));
        assert!(err.is_transient());

        let err = ModelApiError::from_status(StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, ModelApiError::ClientError { status: 401, .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn invalid_response_is_permanent() {
        assert!(!ModelApiError::InvalidResponse("empty".into()).is_transient());
    }
}
