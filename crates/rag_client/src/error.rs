//! Streaming error types

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StreamError {
    #[error("failed to reach the query service: {0}")]
    Connect(String),

    #[error("query service returned status {status}")]
    Status { status: u16 },

    #[error("malformed stream chunk: {0}")]
    Protocol(String),

    #[error("stream ended before a completion chunk arrived")]
    Incomplete,

    #[error("stream cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, StreamError>;

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Connect(err.to_string())
    }
}
