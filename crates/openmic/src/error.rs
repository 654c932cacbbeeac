//! OpenMic client error types.

use thiserror::Error;

/// Errors that can occur when talking to the OpenMic API.
#[derive(Debug, Error)]
pub enum OpenMicError {
    /// The provider returned a non-success status. Carries the status code
    /// and the raw response body so callers can surface it as-is.
    #[error("OpenMic API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// The request could not be sent or the response body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Result type for OpenMic operations.
pub type Result<T> = std::result::Result<T, OpenMicError>;
