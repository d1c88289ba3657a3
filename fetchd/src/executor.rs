//! Fetch executor: performs exactly one bounded fetch for a job, reports the normalized
//! outcome and tells the owning poller whether the job may continue.

use crate::config::PollerConfig;
use crate::error::FetchError;
use crate::latency::{LATENCY_CEILING_SECS, normalize};
use crate::message::{
    FetchOutcome, Job, SENTINEL_CONTENT, StatusClass, StopReason, TerminationSignal,
};
use crate::responding::ResultReporter;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What an attempt tells its poller: `Ok(())` to keep polling, `Err` to stop the job.
pub type AttemptSignal = Result<(), TerminationSignal>;

/// One attempt for a job, run on its own task by the poller.
#[async_trait]
pub trait Attempt: Send + Sync {
    /// Runs to completion, reporting its outcome before returning. `scope` is cancelled when
    /// the owning job stops.
    async fn execute(&self, job: &Job, scope: CancellationToken) -> AttemptSignal;
}

/// Per-attempt limits.
#[derive(Debug, Clone)]
pub struct AttemptSettings {
    pub timeout: Duration,
    pub body_limit: usize,
    pub precision: f64,
}

impl From<&PollerConfig> for AttemptSettings {
    fn from(conf: &PollerConfig) -> Self {
        Self {
            timeout: conf.attempt_timeout,
            body_limit: conf.body_limit,
            precision: conf.latency_precision,
        }
    }
}

// A response that passed status checks, with its raw round-trip time.
struct Fetched {
    body: String,
    elapsed: f64,
}

pub struct FetchExecutor {
    client: reqwest::Client,
    reporter: Arc<dyn ResultReporter>,
    settings: AttemptSettings,
}

impl FetchExecutor {
    pub fn new(reporter: Arc<dyn ResultReporter>, settings: AttemptSettings) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0))
            .build()
            .context("Failed to build reqwest client")?;

        Ok(Self {
            client,
            reporter,
            settings,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        let start_time = tokio::time::Instant::now();
        let response = self
            .client
            .get(url)
            .header(reqwest::header::CONNECTION, "close")
            .send()
            .await
            .map_err(FetchError::Transport)?;
        let elapsed = start_time.elapsed().as_secs_f64();

        match response.status() {
            StatusCode::OK => {
                let body = self.read_body(response).await?;
                Ok(Fetched { body, elapsed })
            }
            StatusCode::NOT_FOUND => Err(FetchError::NotFound),
            other => Err(FetchError::UnclassifiedStatus(other)),
        }
    }

    // Reads the body, refusing anything over the configured limit.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<String, FetchError> {
        let limit = self.settings.body_limit;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::OversizedBody { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(FetchError::UnreadableBody)? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::OversizedBody { limit });
            }
            body.extend_from_slice(&chunk);
        }

        match String::from_utf8(body) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::debug!("response body is not valid UTF-8 ({}), replacing invalid bytes", e);
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    /// Runs the fetch under the attempt timeout and the job's cancellation scope.
    async fn bounded_fetch(
        &self,
        url: &str,
        scope: &CancellationToken,
    ) -> Result<Fetched, FetchError> {
        tokio::select! {
            biased;
            _ = scope.cancelled() => Err(FetchError::Cancelled),
            result = tokio::time::timeout(self.settings.timeout, self.fetch(url)) => {
                result.unwrap_or(Err(FetchError::Timeout(self.settings.timeout)))
            }
        }
    }

    /// Converts a raw attempt result into the record-ready outcome.
    fn outcome(result: Result<Fetched, FetchError>, precision: f64) -> FetchOutcome {
        match result {
            Ok(fetched) if fetched.elapsed > LATENCY_CEILING_SECS => FetchOutcome {
                class: StatusClass::Success,
                content: SENTINEL_CONTENT.to_string(),
                elapsed: LATENCY_CEILING_SECS,
                message: format!("latency clamped from {:.3}s", fetched.elapsed),
            },
            Ok(fetched) => FetchOutcome {
                class: StatusClass::Success,
                content: fetched.body,
                elapsed: normalize(fetched.elapsed, precision),
                message: String::new(),
            },
            Err(e) => FetchOutcome {
                class: e.class(),
                content: SENTINEL_CONTENT.to_string(),
                elapsed: 0.0,
                message: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl Attempt for FetchExecutor {
    async fn execute(&self, job: &Job, scope: CancellationToken) -> AttemptSignal {
        let name = format!("Executor-{}", job.id);
        tracing::debug!("{}: start", name);

        let attempt_scope = scope.child_token();
        let result = {
            let _teardown = attempt_scope.clone().drop_guard();
            self.bounded_fetch(&job.url, &attempt_scope).await
        };

        let outcome = Self::outcome(result, self.settings.precision);
        let ack = self.reporter.submit(outcome.to_record(job.id)).await;
        tracing::debug!(
            "{}: {} in {}s, reporter accepted={} ({})",
            name,
            outcome.class,
            outcome.elapsed,
            ack.accepted,
            ack.message
        );

        if !outcome.is_success() {
            tracing::info!("{}: {}", name, outcome.message);
            return Err(TerminationSignal::new(
                StopReason::Failed(outcome.class),
                outcome.message,
            ));
        }

        if !ack.accepted {
            return Err(TerminationSignal::new(StopReason::Rejected, ack.message));
        }

        Ok(())
    }
}
