use crate::{
    Config,
    adding::AddingService,
    api::{self, AppState},
    executor::{AttemptSettings, FetchExecutor},
    job_pool::JobPool,
    reporters::create_enabled_reporters,
    responding::ResponseService,
    storage::{FetchStore, ResponseStore},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};

pub struct Server {
    conf: Config,
    state: AppState,
}

impl Server {
    /// Wires stores, services and the job pool from the configuration.
    pub fn new(conf: Config) -> Result<Self> {
        let fetches = Arc::new(FetchStore::new());
        let responses = Arc::new(ResponseStore::new());

        let reporter = Arc::new(ResponseService::new(
            responses.clone(),
            create_enabled_reporters(&conf),
        ));
        let executor = FetchExecutor::new(reporter, AttemptSettings::from(&conf.poller))?;
        let jobs = Arc::new(JobPool::new(Arc::new(executor), conf.poller.halt_after));
        let adding = Arc::new(AddingService::new(fetches.clone(), &conf.intake.url_pattern)?);

        Ok(Self {
            state: AppState {
                fetches,
                responses,
                adding,
                jobs,
            },
            conf,
        })
    }

    /// Serves the API until SIGINT or SIGTERM, then drains the job pool.
    pub async fn start(&self) -> Result<()> {
        let router = api::create_router(self.state.clone(), self.conf.server.max_body_size);
        let listener = tokio::net::TcpListener::bind(&self.conf.server.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.conf.server.addr))?;
        tracing::info!("fetchd listening on {}", self.conf.server.addr);

        let mut sigint_stream = signal(SignalKind::interrupt()).context("watch SIGINT failed")?;
        let mut sigterm_stream = signal(SignalKind::terminate()).context("watch SIGTERM failed")?;
        let shutdown = async move {
            tokio::select! {
                _ = sigint_stream.recv() => {
                    tracing::info!("SIGINT received, shutdown initiated...");
                }
                _ = sigterm_stream.recv() => {
                    tracing::info!("SIGTERM received, shutdown initiated...");
                }
            }
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;

        self.state.jobs.shutdown(self.conf.server.shutdown_timeout).await;
        tracing::info!("fetchd stopped");
        Ok(())
    }
}
