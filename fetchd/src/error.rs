//! Errors an individual fetch attempt can end with.

use crate::message::StatusClass;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Why an attempt did not yield usable body text.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Building or sending the request failed.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The attempt ran past its per-attempt timeout.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The owning job stopped while the attempt was in flight.
    #[error("attempt cancelled")]
    Cancelled,

    #[error("Not Found")]
    NotFound,

    #[error("response body exceeds {limit} bytes")]
    OversizedBody { limit: usize },

    #[error("error reading the body: {0}")]
    UnreadableBody(#[source] reqwest::Error),

    #[error("unexpected response status {0}")]
    UnclassifiedStatus(StatusCode),
}

impl FetchError {
    pub fn class(&self) -> StatusClass {
        match self {
            FetchError::Transport(_)
            | FetchError::Timeout(_)
            | FetchError::Cancelled
            | FetchError::UnreadableBody(_) => StatusClass::ClientOrNetworkError,
            FetchError::NotFound => StatusClass::NotFound,
            FetchError::OversizedBody { .. } => StatusClass::TooLarge,
            FetchError::UnclassifiedStatus(_) => StatusClass::Other,
        }
    }
}
