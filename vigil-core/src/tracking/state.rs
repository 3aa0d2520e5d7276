//! Poller state machine
//!
//! `PollerState::apply` maps (state, classified response) to (next state,
//! action). The driver owns scheduling; this module owns every decision
//! about delays, failure budgets and termination.

use std::time::Duration;

use serde_json::Value;

use super::policy::BackoffPolicy;
use super::status::{RetryReason, TerminalReason, TrackerStatus};
use crate::domain::job::{Job, JobStatus};

/// Classified result of a single status request
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// 2xx with a parsed job body
    Status(Job),
    /// 404
    NotFound,
    /// 429, with the parsed `Retry-After` header if any
    RateLimited { retry_after: Option<Duration> },
    /// 503
    Overloaded,
    /// Any other non-2xx status
    HttpError { status: u16 },
    /// Client-side timeout elapsed
    Timeout,
    /// Transport or decoding failure
    Network(String),
}

/// Payload handed to the completion callback
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub message: Option<String>,
    pub results: Option<Value>,
    pub job: Job,
}

impl From<Job> for Completion {
    fn from(job: Job) -> Self {
        Self {
            message: job.message.clone(),
            results: job.results.clone(),
            job,
        }
    }
}

/// How tracking ended, other than successful completion
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Backend reported the job as failed
    JobFailed(Job),
    /// Job is missing or unreachable; tracking gave up
    Invalid(TerminalReason),
}

impl Termination {
    /// Status to report for this termination
    pub fn status(&self) -> TrackerStatus {
        match self {
            Termination::JobFailed(job) => TrackerStatus::Failed(job.clone()),
            Termination::Invalid(reason) => TrackerStatus::Stopped(reason.clone()),
        }
    }
}

/// What the driver must do next
#[derive(Debug, Clone, PartialEq)]
pub enum PollAction {
    /// Wait `delay`, then poll again
    ScheduleAfter {
        delay: Duration,
        status: TrackerStatus,
    },
    /// Job completed: fire the completion callback and stop
    InvokeCallback(Completion),
    /// Stop polling without a callback
    Terminate(Termination),
    /// State is no longer active; nothing to do
    Ignore,
}

impl PollAction {
    /// Status a caller should see after this action, if it changes anything
    pub fn status(&self) -> Option<TrackerStatus> {
        match self {
            PollAction::ScheduleAfter { status, .. } => Some(status.clone()),
            PollAction::InvokeCallback(completion) => {
                Some(TrackerStatus::Completed(completion.job.clone()))
            }
            PollAction::Terminate(termination) => Some(termination.status()),
            PollAction::Ignore => None,
        }
    }

    /// Whether this action ends tracking
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollAction::InvokeCallback(_) | PollAction::Terminate(_)
        )
    }
}

/// Per-job poller state
#[derive(Debug, Clone, PartialEq)]
pub struct PollerState {
    failure_count: u32,
    current_delay: Duration,
    is_valid_job: bool,
    finished: bool,
    policy: BackoffPolicy,
}

impl PollerState {
    /// Fresh state for a newly supplied job id
    pub fn new(policy: &BackoffPolicy) -> Self {
        Self {
            failure_count: 0,
            current_delay: policy.base_delay,
            is_valid_job: true,
            finished: false,
            policy: policy.clone(),
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn is_valid_job(&self) -> bool {
        self.is_valid_job
    }

    /// Neither judged invalid nor finished
    pub fn is_active(&self) -> bool {
        self.is_valid_job && !self.finished
    }

    /// Applies one classified response
    pub fn apply(&self, outcome: PollOutcome) -> (PollerState, PollAction) {
        let mut next = self.clone();

        if !self.is_active() {
            return (next, PollAction::Ignore);
        }

        match outcome {
            PollOutcome::Status(job) => {
                next.failure_count = 0;
                next.current_delay = next.policy.base_delay;
                match job.status {
                    JobStatus::Completed => {
                        next.finished = true;
                        (next, PollAction::InvokeCallback(Completion::from(job)))
                    }
                    JobStatus::Failed => {
                        next.finished = true;
                        (next, PollAction::Terminate(Termination::JobFailed(job)))
                    }
                    _ => {
                        let delay = next.current_delay;
                        (
                            next,
                            PollAction::ScheduleAfter {
                                delay,
                                status: TrackerStatus::Running(job),
                            },
                        )
                    }
                }
            }
            PollOutcome::NotFound => {
                next.is_valid_job = false;
                (
                    next,
                    PollAction::Terminate(Termination::Invalid(TerminalReason::NotFound)),
                )
            }
            PollOutcome::RateLimited { retry_after } => {
                next.current_delay = next
                    .policy
                    .after_rate_limit(self.current_delay, retry_after);
                next.retry(RetryReason::RateLimited)
            }
            PollOutcome::Overloaded => {
                next.current_delay = next.policy.after_overload(self.current_delay);
                next.retry(RetryReason::Overloaded)
            }
            PollOutcome::HttpError { status } => next.fail(
                RetryReason::ServerError { status },
                BackoffPolicy::after_server_error,
            ),
            PollOutcome::Timeout => {
                next.fail(RetryReason::Timeout, BackoffPolicy::after_network_failure)
            }
            PollOutcome::Network(message) => next.fail(
                RetryReason::Network(message),
                BackoffPolicy::after_network_failure,
            ),
        }
    }

    fn fail(
        mut self,
        reason: RetryReason,
        backoff: fn(&BackoffPolicy, Duration) -> Duration,
    ) -> (PollerState, PollAction) {
        self.failure_count += 1;

        if self.failure_count >= self.policy.max_failures {
            self.is_valid_job = false;
            let termination = Termination::Invalid(TerminalReason::ExhaustedRetries {
                attempts: self.failure_count,
                last: reason,
            });
            return (self, PollAction::Terminate(termination));
        }

        self.current_delay = backoff(&self.policy, self.current_delay);
        self.retry(reason)
    }

    fn retry(self, reason: RetryReason) -> (PollerState, PollAction) {
        let action = PollAction::ScheduleAfter {
            delay: self.current_delay,
            status: TrackerStatus::Retrying {
                reason,
                retry_in: self.current_delay,
                failures: self.failure_count,
                max_failures: self.policy.max_failures,
            },
        };
        (self, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn job(status: JobStatus) -> Job {
        Job {
            id: "job-42".to_string(),
            job_type: None,
            status,
            progress: 0,
            total_steps: 0,
            current_step: 0,
            message: None,
            metadata: None,
            started_at: None,
            updated_at: None,
            completed_at: None,
            error: None,
            results: None,
        }
    }

    fn delay_of(action: &PollAction) -> Duration {
        match action {
            PollAction::ScheduleAfter { delay, .. } => *delay,
            other => panic!("expected ScheduleAfter, got {:?}", other),
        }
    }

    fn run(outcomes: Vec<PollOutcome>) -> (PollerState, Vec<PollAction>) {
        let mut state = PollerState::new(&BackoffPolicy::default());
        let mut actions = Vec::new();
        for outcome in outcomes {
            let (next, action) = state.apply(outcome);
            state = next;
            actions.push(action);
        }
        (state, actions)
    }

    #[test]
    fn test_initial_state() {
        let state = PollerState::new(&BackoffPolicy::default());
        assert_eq!(state.failure_count(), 0);
        assert_eq!(state.current_delay(), ms(2_000));
        assert!(state.is_valid_job());
        assert!(state.is_active());
    }

    #[test]
    fn test_running_schedules_base_delay() {
        let (state, actions) = run(vec![PollOutcome::Status(job(JobStatus::Running))]);
        assert_eq!(delay_of(&actions[0]), ms(2_000));
        assert!(state.is_active());
    }

    #[test]
    fn test_unknown_status_keeps_polling() {
        let (_, actions) = run(vec![PollOutcome::Status(job(JobStatus::Unknown(
            "indexing".to_string(),
        )))]);
        assert_eq!(delay_of(&actions[0]), ms(2_000));
    }

    #[test]
    fn test_completed_invokes_callback_with_results() {
        let mut done = job(JobStatus::Completed);
        done.results = Some(json!({ "ok": true }));
        done.message = Some("Found 12 articles".to_string());

        let (state, actions) = run(vec![PollOutcome::Status(done)]);
        match &actions[0] {
            PollAction::InvokeCallback(completion) => {
                assert_eq!(completion.results, Some(json!({ "ok": true })));
                assert_eq!(completion.message.as_deref(), Some("Found 12 articles"));
            }
            other => panic!("expected InvokeCallback, got {:?}", other),
        }
        assert!(!state.is_active());
    }

    #[test]
    fn test_callback_fires_at_most_once() {
        let (_, actions) = run(vec![
            PollOutcome::Status(job(JobStatus::Completed)),
            PollOutcome::Status(job(JobStatus::Completed)),
        ]);
        assert!(matches!(actions[0], PollAction::InvokeCallback(_)));
        assert_eq!(actions[1], PollAction::Ignore);
    }

    #[test]
    fn test_failed_job_terminates_without_callback() {
        let (state, actions) = run(vec![PollOutcome::Status(job(JobStatus::Failed))]);
        assert!(matches!(
            actions[0],
            PollAction::Terminate(Termination::JobFailed(_))
        ));
        assert!(!state.is_active());
    }

    #[test]
    fn test_not_found_short_circuits_without_budget() {
        let (state, actions) = run(vec![PollOutcome::NotFound]);
        assert_eq!(
            actions[0],
            PollAction::Terminate(Termination::Invalid(TerminalReason::NotFound))
        );
        assert_eq!(state.failure_count(), 0);
        assert!(!state.is_valid_job());
    }

    #[test]
    fn test_invalid_state_ignores_everything() {
        let (state, actions) = run(vec![
            PollOutcome::NotFound,
            PollOutcome::Status(job(JobStatus::Completed)),
            PollOutcome::Overloaded,
        ]);
        assert_eq!(actions[1], PollAction::Ignore);
        assert_eq!(actions[2], PollAction::Ignore);
        assert!(!state.is_valid_job());
    }

    #[test]
    fn test_rate_limit_never_exhausts_budget() {
        let mut state = PollerState::new(&BackoffPolicy::default());
        let mut prev = state.current_delay();

        for _ in 0..10 {
            let (next, action) = state.apply(PollOutcome::RateLimited { retry_after: None });
            let expected = (prev * 3).max(ms(30_000)).min(ms(120_000));
            assert_eq!(delay_of(&action), expected);
            assert_eq!(next.failure_count(), 0);
            assert!(next.is_active());
            prev = expected;
            state = next;
        }
    }

    #[test]
    fn test_rate_limit_retry_after() {
        let (state, actions) = run(vec![
            PollOutcome::RateLimited {
                retry_after: Some(Duration::from_secs(7)),
            },
            PollOutcome::RateLimited {
                retry_after: Some(Duration::from_secs(300)),
            },
        ]);
        assert_eq!(delay_of(&actions[0]), ms(7_000));
        assert_eq!(delay_of(&actions[1]), ms(120_000));
        assert_eq!(state.failure_count(), 0);
    }

    #[test]
    fn test_overload_backoff_sequence() {
        let (state, actions) = run(vec![PollOutcome::Overloaded; 4]);
        let delays: Vec<_> = actions.iter().map(delay_of).collect();
        assert_eq!(delays, vec![ms(8_000), ms(32_000), ms(128_000), ms(180_000)]);
        assert_eq!(state.failure_count(), 0);
    }

    #[test]
    fn test_three_strikes_for_server_errors() {
        let (state, actions) = run(vec![PollOutcome::HttpError { status: 500 }; 3]);
        assert_eq!(delay_of(&actions[0]), ms(3_000));
        assert_eq!(delay_of(&actions[1]), ms(4_500));
        match &actions[2] {
            PollAction::Terminate(Termination::Invalid(TerminalReason::ExhaustedRetries {
                attempts,
                last,
            })) => {
                assert_eq!(*attempts, 3);
                assert_eq!(*last, RetryReason::ServerError { status: 500 });
            }
            other => panic!("expected ExhaustedRetries, got {:?}", other),
        }
        assert!(!state.is_valid_job());
    }

    #[test]
    fn test_two_server_errors_keep_polling() {
        let (state, actions) = run(vec![PollOutcome::HttpError { status: 500 }; 2]);
        assert!(!actions[1].is_terminal());
        assert_eq!(state.failure_count(), 2);
        assert!(state.is_active());
    }

    #[test]
    fn test_server_error_ceiling() {
        let policy = BackoffPolicy::with_limits(ms(2_000), 10);
        let mut state = PollerState::new(&policy);
        let mut delays = Vec::new();
        for _ in 0..6 {
            let (next, action) = state.apply(PollOutcome::HttpError { status: 502 });
            delays.push(delay_of(&action));
            state = next;
        }
        assert_eq!(
            delays,
            vec![
                ms(3_000),
                ms(4_500),
                ms(6_750),
                ms(10_000),
                ms(10_000),
                ms(10_000)
            ]
        );
    }

    #[test]
    fn test_timeout_backoff_sequence() {
        let policy = BackoffPolicy::with_limits(ms(2_000), 10);
        let mut state = PollerState::new(&policy);
        let mut delays = Vec::new();
        for _ in 0..4 {
            let (next, action) = state.apply(PollOutcome::Timeout);
            delays.push(delay_of(&action));
            state = next;
        }
        assert_eq!(delays, vec![ms(4_000), ms(8_000), ms(15_000), ms(15_000)]);
    }

    #[test]
    fn test_network_failures_share_budget_with_server_errors() {
        let (state, actions) = run(vec![
            PollOutcome::Timeout,
            PollOutcome::HttpError { status: 500 },
            PollOutcome::Network("connection reset".to_string()),
        ]);
        assert!(matches!(
            &actions[2],
            PollAction::Terminate(Termination::Invalid(TerminalReason::ExhaustedRetries {
                last: RetryReason::Network(_),
                ..
            }))
        ));
        assert!(!state.is_active());
    }

    #[test]
    fn test_throttling_does_not_reset_failures() {
        let (state, _) = run(vec![
            PollOutcome::HttpError { status: 500 },
            PollOutcome::Overloaded,
            PollOutcome::RateLimited { retry_after: None },
        ]);
        assert_eq!(state.failure_count(), 1);
    }

    #[test]
    fn test_success_resets_failures_and_delay() {
        let (state, actions) = run(vec![
            PollOutcome::HttpError { status: 500 },
            PollOutcome::Timeout,
            PollOutcome::Overloaded,
            PollOutcome::Status(job(JobStatus::Running)),
        ]);
        assert_eq!(delay_of(&actions[3]), ms(2_000));
        assert_eq!(state.failure_count(), 0);
        assert_eq!(state.current_delay(), ms(2_000));
    }

    #[test]
    fn test_end_to_end_overload_then_complete() {
        let mut running = job(JobStatus::Running);
        running.progress = 40;
        let mut done = job(JobStatus::Completed);
        done.progress = 100;
        done.results = Some(json!({ "ok": true }));

        let (state, actions) = run(vec![
            PollOutcome::Overloaded,
            PollOutcome::Overloaded,
            PollOutcome::Status(running),
            PollOutcome::Status(done),
        ]);

        assert_eq!(delay_of(&actions[0]), ms(8_000));
        assert_eq!(delay_of(&actions[1]), ms(32_000));
        assert_eq!(delay_of(&actions[2]), ms(2_000));
        match &actions[3] {
            PollAction::InvokeCallback(completion) => {
                assert_eq!(completion.results, Some(json!({ "ok": true })));
            }
            other => panic!("expected InvokeCallback, got {:?}", other),
        }
        assert!(!state.is_active());
    }

    #[test]
    fn test_action_status_mapping() {
        let (_, actions) = run(vec![PollOutcome::Overloaded]);
        assert!(actions[0].status().is_some_and(|s| s.is_retrying()));
        assert_eq!(PollAction::Ignore.status(), None);
    }
}
