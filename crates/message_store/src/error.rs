//! Message store error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("message API returned status {status}")]
    Status { status: u16 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Request(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for StoreError {
    fn from(err: reqwest_middleware::Error) -> Self {
        StoreError::Request(err.to_string())
    }
}
