use std::time::Duration;

use thiserror::Error;
use warp::http::StatusCode;

/// Failures of the underlying document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("store query failed: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("stored document could not be decoded: {0}")]
    Decode(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(value: mongodb::error::Error) -> Self {
        StoreError::Backend(Box::new(value))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid id {0:?}")]
    InvalidId(String),

    #[error("invalid cursor {0:?}")]
    InvalidCursor(String),

    #[error("record {0} not found")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidId(_) | Error::InvalidCursor(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::StoreUnavailable(StoreError::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            Error::StoreUnavailable(StoreError::Backend(_) | StoreError::Decode(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found in the environment")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
