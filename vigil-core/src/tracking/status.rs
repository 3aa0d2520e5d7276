//! Tracker statuses
//!
//! What a caller observes while a job is tracked. Retrying statuses keep a
//! spinner up; terminal ones end tracking and never change again.

use std::time::Duration;

use thiserror::Error;

use crate::domain::job::Job;

/// Why a poll has to be retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    /// HTTP 429
    RateLimited,
    /// HTTP 503
    Overloaded,
    /// Any other non-2xx status
    ServerError { status: u16 },
    /// The request did not finish within the client-side timeout
    Timeout,
    /// Transport failure (DNS, connection refused, reset, bad body)
    Network(String),
}

impl RetryReason {
    /// Throttling is the server asking us to slow down, not a failure on our side
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, RetryReason::RateLimited | RetryReason::Overloaded)
    }
}

impl std::fmt::Display for RetryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryReason::RateLimited => write!(f, "Server is busy"),
            RetryReason::Overloaded => write!(f, "Server is overloaded"),
            RetryReason::ServerError { status: 401 | 403 } => {
                write!(f, "Not authorized to read job status")
            }
            RetryReason::ServerError { status: 500 } => write!(f, "Internal server error"),
            RetryReason::ServerError {
                status: status @ (502 | 504),
            } => write!(f, "Gateway error (HTTP {})", status),
            RetryReason::ServerError { status } => {
                write!(f, "Unexpected response (HTTP {})", status)
            }
            RetryReason::Timeout => write!(f, "Request timed out"),
            RetryReason::Network(message) => write!(f, "Network error: {}", message),
        }
    }
}

/// Why tracking stopped without the job reaching a final state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminalReason {
    #[error("Job not found. It may be an old or expired job.")]
    NotFound,

    #[error("Stopped tracking after {attempts} consecutive failures ({last})")]
    ExhaustedRetries { attempts: u32, last: RetryReason },
}

/// Observable state of a tracked job
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerStatus {
    /// No response received yet
    Connecting,

    /// Latest snapshot of an in-flight job
    Running(Job),

    /// Last poll failed or was throttled; another one is scheduled
    Retrying {
        reason: RetryReason,
        retry_in: Duration,
        failures: u32,
        max_failures: u32,
    },

    /// Job finished successfully
    Completed(Job),

    /// Job finished with an error reported by the backend
    Failed(Job),

    /// Tracking gave up; the job is missing or unreachable
    Stopped(TerminalReason),

    /// Caller stopped watching before the job finished
    Detached,
}

impl TrackerStatus {
    /// Polling has ended for good
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrackerStatus::Completed(_)
                | TrackerStatus::Failed(_)
                | TrackerStatus::Stopped(_)
                | TrackerStatus::Detached
        )
    }

    /// Still polling after a failed or throttled request
    pub fn is_retrying(&self) -> bool {
        matches!(self, TrackerStatus::Retrying { .. })
    }

    /// Terminal state that must be shown as an error
    pub fn is_error(&self) -> bool {
        matches!(self, TrackerStatus::Failed(_) | TrackerStatus::Stopped(_))
    }

    /// Human-readable line describing this status
    pub fn message(&self) -> String {
        match self {
            TrackerStatus::Connecting => "Connecting...".to_string(),
            TrackerStatus::Running(job) => match &job.message {
                Some(message) if !message.is_empty() => message.clone(),
                _ => format!("Job is {}", job.status),
            },
            TrackerStatus::Retrying {
                reason,
                retry_in,
                failures,
                max_failures,
            } => {
                let secs = retry_in.as_secs_f64();
                if reason.counts_as_failure() {
                    format!(
                        "{}, retrying in {:.1}s (attempt {}/{})",
                        reason, secs, failures, max_failures
                    )
                } else {
                    format!("{}, retrying in {:.1}s", reason, secs)
                }
            }
            TrackerStatus::Completed(job) => job
                .message
                .clone()
                .unwrap_or_else(|| "Job completed".to_string()),
            TrackerStatus::Failed(job) => format!(
                "Job failed: {}",
                job.error.as_deref().unwrap_or("no error details")
            ),
            TrackerStatus::Stopped(reason) => reason.to_string(),
            TrackerStatus::Detached => "Stopped watching job".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobStatus;

    fn job(status: JobStatus) -> Job {
        Job {
            id: "job-1".to_string(),
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

    #[test]
    fn test_retrying_is_not_terminal() {
        let status = TrackerStatus::Retrying {
            reason: RetryReason::Overloaded,
            retry_in: Duration::from_secs(8),
            failures: 0,
            max_failures: 3,
        };
        assert!(status.is_retrying());
        assert!(!status.is_terminal());
        assert!(!status.is_error());
    }

    #[test]
    fn test_stopped_is_terminal_error() {
        let status = TrackerStatus::Stopped(TerminalReason::NotFound);
        assert!(status.is_terminal());
        assert!(status.is_error());
        assert!(!status.is_retrying());
        assert!(status.message().contains("old or expired"));
    }

    #[test]
    fn test_completed_is_terminal_but_not_error() {
        let status = TrackerStatus::Completed(job(JobStatus::Completed));
        assert!(status.is_terminal());
        assert!(!status.is_error());
        assert_eq!(status.message(), "Job completed");
    }

    #[test]
    fn test_running_and_connecting_are_live() {
        assert!(!TrackerStatus::Connecting.is_terminal());
        assert!(!TrackerStatus::Running(job(JobStatus::Running)).is_terminal());
    }

    #[test]
    fn test_throttling_does_not_count_as_failure() {
        assert!(!RetryReason::RateLimited.counts_as_failure());
        assert!(!RetryReason::Overloaded.counts_as_failure());
        assert!(RetryReason::Timeout.counts_as_failure());
        assert!(RetryReason::ServerError { status: 500 }.counts_as_failure());
    }

    #[test]
    fn test_timeout_and_network_messages_differ() {
        let timeout = RetryReason::Timeout.to_string();
        let network = RetryReason::Network("connection refused".to_string()).to_string();
        assert!(timeout.contains("timed out"));
        assert!(network.starts_with("Network error"));
    }

    #[test]
    fn test_status_specific_messages() {
        assert_eq!(
            RetryReason::ServerError { status: 502 }.to_string(),
            "Gateway error (HTTP 502)"
        );
        assert_eq!(
            RetryReason::ServerError { status: 403 }.to_string(),
            "Not authorized to read job status"
        );
    }

    #[test]
    fn test_retry_message_shows_attempts_for_counted_failures() {
        let status = TrackerStatus::Retrying {
            reason: RetryReason::ServerError { status: 500 },
            retry_in: Duration::from_millis(3_000),
            failures: 1,
            max_failures: 3,
        };
        assert_eq!(
            status.message(),
            "Internal server error, retrying in 3.0s (attempt 1/3)"
        );
    }

    #[test]
    fn test_failed_message_includes_backend_error() {
        let mut failed = job(JobStatus::Failed);
        failed.error = Some("PubMed quota exceeded".to_string());
        assert_eq!(
            TrackerStatus::Failed(failed).message(),
            "Job failed: PubMed quota exceeded"
        );
    }
}
