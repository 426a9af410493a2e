//! Response classification.
//!
//! [`ensure_success`] is the single gate every response passes before
//! its body is touched.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A raw HTTP response as seen by the client.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Reason phrase, e.g. `Not Found`.
    ///
    /// reqwest does not expose the reason phrase sent by the server, so
    /// [`ApiResponse::new`] fills in the canonical phrase for the status.
    /// Transports that see the raw phrase can set it with
    /// [`with_status_text`](Self::with_status_text).
    pub status_text: String,
    pub body: Bytes,
}

impl ApiResponse {
    /// Build a response whose status text is the canonical reason phrase.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let status_text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());
        Self {
            status,
            status_text,
            body: body.into(),
        }
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Parse the body of a response that already passed [`ensure_success`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Classify a response by status.
///
/// Returns the response unchanged for `2xx`, [`ApiError::Unauthenticated`]
/// for `401`, and [`ApiError::RequestFailed`] carrying the status text for
/// anything else. The body of a failed response is never read.
pub fn ensure_success(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    let status = response.status;
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthenticated);
    }
    Err(ApiError::RequestFailed {
        status: status.as_u16(),
        status_text: response.status_text,
    })
}
