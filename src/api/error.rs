//! API Error Types
//!
//! Errors produced while talking to the dashboard backend over HTTP.

use thiserror::Error;

/// A failed fetch against the backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded into the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Build a status error from a code and reason phrase
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
