use crate::executor::Attempt;
use crate::message::{Job, TerminationSignal};
use crate::poller::Poller;
use crate::storage::lock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns every running poller and the tokens that stop them.
pub struct JobPool {
    attempt: Arc<dyn Attempt>,
    halt_after: Duration,
    root: CancellationToken,
    handles: Mutex<HashMap<i64, HandleHolder>>,
}

struct HandleHolder {
    name: String,
    token: CancellationToken,
    handle: JoinHandle<TerminationSignal>,
}

impl JobPool {
    pub fn new(attempt: Arc<dyn Attempt>, halt_after: Duration) -> Self {
        Self {
            attempt,
            halt_after,
            root: CancellationToken::new(),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a poller for the job. Jobs spawned after shutdown stop immediately.
    pub fn spawn(&self, job: Job) {
        let token = self.root.child_token();
        let name = format!("Poller-{}", job.id);
        let id = job.id;
        let poller = Poller::new(job, Arc::clone(&self.attempt), self.halt_after, token.clone());
        let handle = tokio::spawn(poller.run());

        let mut handles = lock(&self.handles);
        handles.retain(|_, holder| !holder.handle.is_finished());
        handles.insert(id, HandleHolder { name, token, handle });
        tracing::debug!("JobPool tracking {} pollers", handles.len());
    }

    /// Cancels the job's poller. Returns whether it was still running.
    pub fn cancel(&self, id: i64) -> bool {
        let Some(holder) = lock(&self.handles).remove(&id) else {
            return false;
        };

        if holder.handle.is_finished() {
            return false;
        }
        holder.token.cancel();
        tracing::info!("{} cancelled", holder.name);
        true
    }

    /// Number of pollers that have not finished yet.
    pub fn running(&self) -> usize {
        lock(&self.handles)
            .values()
            .filter(|holder| !holder.handle.is_finished())
            .count()
    }

    /// Cancels every poller and waits up to `timeout` for each to stop, aborting stragglers.
    pub async fn shutdown(&self, timeout: Duration) {
        tracing::info!("Shutting down JobPool with {} running pollers", self.running());
        self.root.cancel();
        let holders: Vec<HandleHolder> = lock(&self.handles).drain().map(|(_, h)| h).collect();

        for mut holder in holders {
            match tokio::time::timeout(timeout, &mut holder.handle).await {
                Ok(Ok(signal)) => {
                    tracing::debug!("{} completed: {}", holder.name, signal);
                }
                Ok(Err(e)) => {
                    tracing::warn!("{} ended abnormally: {}", holder.name, e);
                }
                Err(_) => {
                    tracing::warn!("{} did not shut down in time, forcing termination", holder.name);
                    holder.handle.abort();
                }
            }
        }
        tracing::info!("JobPool shutdown complete");
    }
}
