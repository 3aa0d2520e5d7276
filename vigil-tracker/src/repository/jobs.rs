//! Jobs repository
//!
//! Fetches job snapshots from the backend and classifies the result for the
//! poller's state machine.

use std::sync::Arc;

use async_trait::async_trait;
use vigil_client::{ClientError, VigilClient};
use vigil_core::tracking::PollOutcome;

/// Repository trait for job status lookups
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Fetches the current snapshot of a job
    ///
    /// Never fails: transport and HTTP errors are folded into the returned
    /// outcome so the caller can apply its backoff policy.
    ///
    /// # Arguments
    /// * `job_id` - The ID of the job to look up
    async fn fetch_job(&self, job_id: &str) -> PollOutcome;
}

/// HTTP implementation of JobRepository
pub struct HttpJobRepository {
    client: Arc<VigilClient>,
}

impl HttpJobRepository {
    /// Creates a new HTTP job repository
    ///
    /// # Arguments
    /// * `client` - Shared backend client, already carrying the bearer token
    pub fn new(client: Arc<VigilClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRepository for HttpJobRepository {
    async fn fetch_job(&self, job_id: &str) -> PollOutcome {
        match self.client.get_job(job_id).await {
            Ok(job) => PollOutcome::Status(job),
            Err(err) => classify_error(err),
        }
    }
}

/// Map a client error onto the poller's outcome taxonomy
fn classify_error(err: ClientError) -> PollOutcome {
    if err.is_not_found() {
        return PollOutcome::NotFound;
    }

    match err {
        ClientError::NotFound(_) => PollOutcome::NotFound,
        ClientError::RateLimited { retry_after } => PollOutcome::RateLimited { retry_after },
        ClientError::Overloaded => PollOutcome::Overloaded,
        ClientError::ApiError { status, .. } => PollOutcome::HttpError { status },
        ClientError::Timeout => PollOutcome::Timeout,
        ClientError::RequestFailed(e) => PollOutcome::Network(e.to_string()),
        ClientError::ParseError(message) | ClientError::InvalidRequest(message) => {
            PollOutcome::Network(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_classify_throttling() {
        assert_eq!(
            classify_error(ClientError::RateLimited {
                retry_after: Some(Duration::from_secs(9))
            }),
            PollOutcome::RateLimited {
                retry_after: Some(Duration::from_secs(9))
            }
        );
        assert_eq!(
            classify_error(ClientError::Overloaded),
            PollOutcome::Overloaded
        );
    }

    #[test]
    fn test_classify_not_found() {
        assert_eq!(
            classify_error(ClientError::NotFound("job-1".to_string())),
            PollOutcome::NotFound
        );
        assert_eq!(
            classify_error(ClientError::api_error(404, "missing")),
            PollOutcome::NotFound
        );
    }

    #[test]
    fn test_classify_generic_failures() {
        assert_eq!(
            classify_error(ClientError::api_error(500, "boom")),
            PollOutcome::HttpError { status: 500 }
        );
        assert_eq!(classify_error(ClientError::Timeout), PollOutcome::Timeout);
        assert!(matches!(
            classify_error(ClientError::ParseError("bad json".to_string())),
            PollOutcome::Network(_)
        ));
    }
}
