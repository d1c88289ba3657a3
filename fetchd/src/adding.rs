//! Job intake: checks a submitted URL and interval, then allocates a key for the job.

use crate::message::Job;
use crate::storage::FetchStore;
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

/// A job request that passed payload decoding but not yet intake rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFetch {
    pub url: String,
    pub interval: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddingError {
    #[error("Interval and URL path are not accepted.")]
    IntervalAndUrl,
    #[error("URL path is not accepted.")]
    Url,
    #[error("Interval value must be greater than 0.")]
    Interval,
}

pub struct AddingService {
    store: Arc<FetchStore>,
    url_pattern: Regex,
}

impl AddingService {
    pub fn new(store: Arc<FetchStore>, url_pattern: &str) -> Result<Self> {
        let url_pattern = Regex::new(url_pattern)
            .with_context(|| format!("Invalid intake url_pattern: {}", url_pattern))?;
        Ok(Self { store, url_pattern })
    }

    /// Validates the request and stores it as a new job.
    pub fn create(&self, fetch: NewFetch) -> Result<Job, AddingError> {
        let url_ok = self.url_pattern.is_match(&fetch.url);

        let interval = match (url_ok, u64::try_from(fetch.interval)) {
            (false, Ok(0) | Err(_)) => return Err(AddingError::IntervalAndUrl),
            (false, Ok(_)) => return Err(AddingError::Url),
            (true, Ok(0) | Err(_)) => return Err(AddingError::Interval),
            (true, Ok(interval)) => interval,
        };

        let job = self.store.create(fetch.url, interval);
        tracing::info!("Job {} accepted: {} every {}s", job.id, job.url, job.interval);
        Ok(job)
    }
}
