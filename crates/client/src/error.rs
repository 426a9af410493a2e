/// Errors from the routine runner API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the session token (HTTP 401).
    #[error("Unauthorized")]
    Unauthenticated,

    /// The server answered with any other non-2xx status.
    #[error("{status_text}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Reason phrase of the status, e.g. `Internal Server Error`.
        status_text: String,
    },

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A success response carried a body of the wrong shape.
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }

    /// HTTP status of a classified failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthenticated => Some(401),
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
