//! Job-related API endpoints

use reqwest::Url;

use crate::VigilClient;
use crate::error::{ClientError, Result};
use vigil_core::domain::job::Job;

impl VigilClient {
    // =============================================================================
    // Job Status
    // =============================================================================

    /// Get the current status of a job
    ///
    /// # Arguments
    /// * `job_id` - The opaque job identifier assigned by the backend
    ///
    /// # Returns
    /// The job snapshot. 404, 429 and 503 come back as dedicated
    /// [`ClientError`] variants so callers can apply different policies.
    ///
    /// # Example
    /// ```no_run
    /// # use vigil_client::VigilClient;
    /// # async fn example() -> Result<(), vigil_client::ClientError> {
    /// let client = VigilClient::new("http://localhost:8000");
    /// let job = client.get_job("job-42").await?;
    /// println!("{} is {}", job.id, job.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        if job_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job id cannot be empty".to_string(),
            ));
        }

        let url = self.job_url(job_id)?;
        let response = self.authorized(self.client.get(url)).send().await?;

        self.handle_response(response, job_id).await
    }

    /// URL of the status endpoint for a job
    ///
    /// The id is appended as a single percent-encoded path segment, so `/`,
    /// `?` and `#` inside an id never change which resource is addressed.
    pub fn job_url(&self, job_id: &str) -> Result<Url> {
        if matches!(job_id, "." | "..") {
            return Err(ClientError::InvalidRequest(format!(
                "invalid job id: {}",
                job_id
            )));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base URL {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!(
                    "base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["jobs", job_id]);

        Ok(url)
    }
}
