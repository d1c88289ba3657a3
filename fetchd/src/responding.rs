//! Result reporting: validates attempt records, stores accepted ones and mirrors them to sinks.

use crate::latency::LATENCY_CEILING_SECS;
use crate::message::{Acknowledgement, ResponseRecord, SENTINEL_CONTENT};
use crate::reporters::Reporter;
use crate::storage::{ResponseStore, StoredRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// Longest accepted record content, in characters.
pub const MAX_CONTENT_CHARS: usize = 102_402;

/// Collaborator every attempt reports its outcome to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultReporter: Send + Sync {
    /// Submits one record and returns whether it was accepted.
    async fn submit(&self, record: ResponseRecord) -> Acknowledgement;
}

/// Result reporter backed by a [`ResponseStore`].
pub struct ResponseService {
    store: Arc<ResponseStore>,
    sinks: Vec<Box<dyn Reporter>>,
}

impl ResponseService {
    pub fn new(store: Arc<ResponseStore>, sinks: Vec<Box<dyn Reporter>>) -> Self {
        Self { store, sinks }
    }

    /// Checks a record against the storage rules. The first failing rule wins.
    pub fn validate(record: &ResponseRecord) -> Result<(), &'static str> {
        let length = record.content.chars().count();

        if record.key < 0 {
            Err("StorageKeyID must be greater or equal 0.")
        } else if record.duration > LATENCY_CEILING_SECS && record.content != SENTINEL_CONTENT {
            Err("Response duration longer than 5s should return null as content.")
        } else if length == 0 || length > MAX_CONTENT_CHARS {
            Err("Response string must be in range (0, 102402] characters.")
        } else if record.duration > LATENCY_CEILING_SECS {
            Err("Response duration cannot be longer than 5s.")
        } else {
            Ok(())
        }
    }

    // Calls every sink concurrently; failures are only logged.
    async fn mirror(&self, record: &StoredRecord) {
        let reporter_futures: Vec<_> = self
            .sinks
            .iter()
            .map(|reporter| async move {
                if let Err(e) = reporter.report(record).await {
                    tracing::warn!("Reporter '{}' failed: {:#}", reporter.name(), e);
                }
            })
            .collect();

        futures::future::join_all(reporter_futures).await;
    }
}

#[async_trait]
impl ResultReporter for ResponseService {
    async fn submit(&self, record: ResponseRecord) -> Acknowledgement {
        if let Err(reason) = Self::validate(&record) {
            tracing::debug!("Response for job {} rejected: {}", record.key, reason);
            return Acknowledgement::rejected(reason);
        }

        let (stored, count) = self.store.append(record);
        tracing::debug!("Response for job {} stored ({} total)", stored.key, count);
        self.mirror(&stored).await;

        Acknowledgement::accepted(count, "Record has been insert into response db.")
    }
}
