//! Job status poller
//!
//! Follows a single job until it completes, fails, or is judged unpollable.
//! Requests are strictly sequential: the next one is scheduled only after the
//! previous outcome has been applied, so there is never more than one request
//! or one pending wait per job.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Duration};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};
use vigil_core::domain::job::Job;
use vigil_core::tracking::{
    BackoffPolicy, Completion, PollAction, PollOutcome, PollerState, TerminalReason, Termination,
    TrackerStatus,
};

use crate::config::TrackerConfig;
use crate::repository::JobRepository;
use crate::store::ActiveJobRegistry;

/// Callback fired once when the job completes
pub type CompletionCallback = Box<dyn FnOnce(Completion) + Send + Sync>;

/// How a poller run ended
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerExit {
    /// Job completed; the callback (if any) has been invoked
    Completed(Completion),
    /// Backend reported the job as failed
    JobFailed(Job),
    /// Job was missing or unreachable
    Stopped(TerminalReason),
    /// Caller detached before the job finished
    Detached,
}

impl TrackerExit {
    /// Whether the run ended in an error the user must see
    pub fn is_error(&self) -> bool {
        matches!(self, TrackerExit::JobFailed(_) | TrackerExit::Stopped(_))
    }
}

/// Summary of a poller run
#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    pub exit: TrackerExit,
    /// Requests issued, including one aborted by detaching
    pub requests: u32,
}

/// Polls `GET /jobs/{id}` for one job
pub struct JobStatusPoller {
    job_id: String,
    repository: Arc<dyn JobRepository>,
    registry: ActiveJobRegistry,
    policy: BackoffPolicy,
    request_timeout: Duration,
    on_complete: Option<CompletionCallback>,
    cancel: CancellationToken,
    status_tx: watch::Sender<TrackerStatus>,
}

impl JobStatusPoller {
    /// Creates a poller for `job_id` using the policy and timeout from `config`
    pub fn new(
        job_id: impl Into<String>,
        repository: Arc<dyn JobRepository>,
        registry: ActiveJobRegistry,
        config: &TrackerConfig,
    ) -> Self {
        let (status_tx, _) = watch::channel(TrackerStatus::Connecting);
        Self {
            job_id: job_id.into(),
            repository,
            registry,
            policy: config.policy.clone(),
            request_timeout: config.request_timeout,
            on_complete: None,
            cancel: CancellationToken::new(),
            status_tx,
        }
    }

    /// Registers the completion callback
    ///
    /// The persisted reference is already released when it runs. A panic in
    /// the callback ends the task without publishing `Completed`.
    pub fn on_complete(
        mut self,
        callback: impl FnOnce(Completion) + Send + Sync + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Receiver for status updates; starts at `Connecting`
    pub fn subscribe(&self) -> watch::Receiver<TrackerStatus> {
        self.status_tx.subscribe()
    }

    /// Token that detaches this poller when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the poller on a new task
    pub fn spawn(self) -> PollerHandle {
        let job_id = self.job_id.clone();
        let status = self.subscribe();
        let cancel = self.cancel.clone();
        let guard = cancel.clone().drop_guard();
        let task = tokio::spawn(self.run());

        PollerHandle {
            job_id,
            status,
            cancel,
            _guard: guard,
            task,
        }
    }

    /// Polls until a terminal outcome or until detached
    pub async fn run(mut self) -> PollReport {
        info!(job_id = %self.job_id, "Starting job status poller");

        let mut on_complete = self.on_complete.take();
        let mut state = PollerState::new(&self.policy);
        let mut requests = 0u32;

        let exit = loop {
            if self.cancel.is_cancelled() {
                break TrackerExit::Detached;
            }

            requests += 1;
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break TrackerExit::Detached,
                outcome = self.poll_once() => outcome,
            };

            debug!(job_id = %self.job_id, request = requests, ?outcome, "Poll finished");

            let (next, action) = state.apply(outcome);
            state = next;

            match action {
                PollAction::ScheduleAfter { delay, status } => {
                    self.status_tx.send_replace(status.clone());
                    if status.is_retrying() {
                        warn!(
                            job_id = %self.job_id,
                            failures = state.failure_count(),
                            "{}",
                            status.message()
                        );
                    }
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break TrackerExit::Detached,
                        _ = time::sleep(delay) => {}
                    }
                }
                PollAction::InvokeCallback(completion) => {
                    info!(job_id = %self.job_id, "Job completed");
                    self.release();
                    if let Some(callback) = on_complete.take() {
                        callback(completion.clone());
                    }
                    self.status_tx
                        .send_replace(TrackerStatus::Completed(completion.job.clone()));
                    break TrackerExit::Completed(completion);
                }
                PollAction::Terminate(Termination::JobFailed(job)) => {
                    warn!(
                        job_id = %self.job_id,
                        error = job.error.as_deref().unwrap_or("unknown"),
                        "Job failed"
                    );
                    self.release();
                    self.status_tx.send_replace(TrackerStatus::Failed(job.clone()));
                    break TrackerExit::JobFailed(job);
                }
                PollAction::Terminate(Termination::Invalid(reason)) => {
                    error!(job_id = %self.job_id, "{}", reason);
                    self.release();
                    self.status_tx
                        .send_replace(TrackerStatus::Stopped(reason.clone()));
                    break TrackerExit::Stopped(reason);
                }
                PollAction::Ignore => {
                    // Terminal actions break out above, so an inactive state
                    // here means there is nothing left to poll.
                    debug!(job_id = %self.job_id, "Poller state inactive");
                    break TrackerExit::Detached;
                }
            }
        };

        if exit == TrackerExit::Detached {
            info!(job_id = %self.job_id, "Detached from job");
            self.status_tx.send_replace(TrackerStatus::Detached);
        }

        PollReport { exit, requests }
    }

    async fn poll_once(&self) -> PollOutcome {
        match time::timeout(self.request_timeout, self.repository.fetch_job(&self.job_id)).await {
            Ok(outcome) => outcome,
            Err(_) => PollOutcome::Timeout,
        }
    }

    /// Drops the persisted reference if it still points at this job
    fn release(&self) {
        match self.registry.release(&self.job_id) {
            Ok(true) => debug!(job_id = %self.job_id, "Released active job reference"),
            Ok(false) => {}
            Err(e) => warn!(job_id = %self.job_id, "Failed to clear tracker state: {}", e),
        }
    }
}

/// Handle to a spawned poller
///
/// Dropping the handle detaches the poller.
pub struct PollerHandle {
    job_id: String,
    status: watch::Receiver<TrackerStatus>,
    cancel: CancellationToken,
    _guard: DropGuard,
    task: JoinHandle<PollReport>,
}

impl PollerHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Receiver for status updates
    pub fn status(&self) -> watch::Receiver<TrackerStatus> {
        self.status.clone()
    }

    /// Stops polling, aborting a request that is still in flight
    pub fn detach(&self) {
        self.cancel.cancel();
    }

    /// Waits for the poller to stop
    pub async fn join(self) -> Result<PollReport, JoinError> {
        self.task.await
    }
}
