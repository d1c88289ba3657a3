//! Per-job scheduler.
//!
//! A poller alternates between waiting out the job's interval and waiting for its single
//! in-flight attempt. Every iteration is one `select!` over the current state's event, the
//! absolute halt timer and the job's cancellation token; whichever fires first is acted on.

use crate::executor::{Attempt, AttemptSignal};
use crate::message::{Job, StatusClass, StopReason, TerminationSignal};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, Sleep, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

/// Prefix for poller instance names
const POLLER_NAME_PREFIX: &str = "Poller";

// Deadline used when `halt_after` cannot be represented as an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

enum PollState {
    /// Interval timer armed.
    Waiting(Pin<Box<Sleep>>),
    /// One attempt in flight; its outcome arrives on the receiver.
    Fetching(oneshot::Receiver<AttemptSignal>),
}

enum Event {
    Tick,
    Signal(AttemptSignal),
    Halt,
    Cancel,
}

pub struct Poller {
    name: String,
    job: Job,
    attempt: Arc<dyn Attempt>,
    halt_after: Duration,
    cancel: CancellationToken,
}

impl Poller {
    /// # Arguments
    /// * `job` - The job this poller owns for its whole lifetime
    /// * `attempt` - Runs one fetch per tick
    /// * `halt_after` - Absolute budget counted from `run`, never reset
    /// * `cancel` - Stops the job early when cancelled
    pub fn new(
        job: Job,
        attempt: Arc<dyn Attempt>,
        halt_after: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            name: format!("{}-{}", POLLER_NAME_PREFIX, job.id),
            job,
            attempt,
            halt_after,
            cancel,
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.job.interval)
    }

    /// Drives the job until an attempt fails, the halt timer fires or the job is cancelled.
    pub async fn run(self) -> TerminationSignal {
        tracing::info!("{}: start ({} every {}s)", self.name, self.job.url, self.job.interval);

        let now = Instant::now();
        let halt = sleep_until(
            now.checked_add(self.halt_after)
                .unwrap_or_else(|| now + FAR_FUTURE),
        );
        tokio::pin!(halt);

        let mut state = PollState::Waiting(Box::pin(sleep(self.interval())));
        let signal = loop {
            let event = match &mut state {
                PollState::Waiting(timer) => tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Event::Cancel,
                    _ = &mut halt => Event::Halt,
                    _ = timer.as_mut() => Event::Tick,
                },
                PollState::Fetching(outcome) => tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Event::Cancel,
                    _ = &mut halt => Event::Halt,
                    received = outcome => Event::Signal(received.unwrap_or_else(|_| {
                        Err(TerminationSignal::new(
                            StopReason::Failed(StatusClass::Other),
                            "attempt ended without signalling",
                        ))
                    })),
                },
            };

            match event {
                Event::Tick => state = PollState::Fetching(self.start_attempt()),
                Event::Signal(Ok(())) => {
                    tracing::debug!("{}: attempt succeeded, re-arming", self.name);
                    state = PollState::Waiting(Box::pin(sleep(self.interval())));
                }
                Event::Signal(Err(signal)) => break signal,
                Event::Halt => {
                    tracing::info!(
                        "{}: halted after {}",
                        self.name,
                        humantime::format_duration(self.halt_after)
                    );
                    break TerminationSignal::new(StopReason::RequestTimeout, "Request Timeout");
                }
                Event::Cancel => break TerminationSignal::new(StopReason::Cancelled, "job cancelled"),
            }
        };

        // Aborts an attempt still in flight after a halt or cancel.
        self.cancel.cancel();
        tracing::info!("{}: stop, {}", self.name, signal);
        signal
    }

    // Spawns the attempt on its own task with a fresh single-slot channel.
    fn start_attempt(&self) -> oneshot::Receiver<AttemptSignal> {
        let (tx, rx) = oneshot::channel();
        let attempt = Arc::clone(&self.attempt);
        let job = self.job.clone();
        let scope = self.cancel.child_token();

        tracing::debug!("{}: starting attempt", self.name);
        tokio::spawn(async move {
            let signal = attempt.execute(&job, scope).await;
            let _ = tx.send(signal);
        });
        rx
    }
}
