//! Vigil HTTP Client
//!
//! A small, type-safe HTTP client for the case-triage backend's job API.
//!
//! Responses are classified on the way in: the statuses a tracker reacts to
//! differently (404, 429, 503) surface as their own [`ClientError`] variants
//! instead of a generic status code.
//!
//! # Example
//!
//! ```no_run
//! use vigil_client::VigilClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vigil_client::ClientError> {
//!     let client = VigilClient::new("http://localhost:8000")
//!         .with_bearer_token(Some("secret".to_string()));
//!
//!     let job = client.get_job("job-42").await?;
//!     println!("{}: {}%", job.status, job.progress_percent());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use vigil_core::domain::job::{Job, JobStatus};

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP client for the Vigil backend API
#[derive(Debug, Clone)]
pub struct VigilClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token forwarded on every request, when present
    auth_token: Option<String>,
}

impl VigilClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use vigil_client::VigilClient;
    ///
    /// let client = VigilClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure connect timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use vigil_client::VigilClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .connect_timeout(Duration::from_secs(5))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = VigilClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth_token: None,
        }
    }

    /// Attach a bearer token supplied by the auth service
    ///
    /// `None` or an empty token sends no `Authorization` header at all; the
    /// server decides whether to reject the request.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry an `Authorization` header
    pub fn has_token(&self) -> bool {
        self.auth_token.is_some()
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Throttling and missing-resource statuses are mapped to dedicated
    /// error variants; every other non-2xx status becomes `ApiError`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(
                status = status.as_u16(),
                resource,
                "request returned error status"
            );
            return Err(classify_status(status, resource, retry_after, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Map a non-success status onto a client error
fn classify_status(
    status: StatusCode,
    resource: &str,
    retry_after: Option<Duration>,
    message: String,
) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(resource.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited { retry_after },
        StatusCode::SERVICE_UNAVAILABLE => ClientError::Overloaded,
        other => ClientError::api_error(other.as_u16(), message),
    }
}

/// Parse a `Retry-After` header expressed in whole or fractional seconds
///
/// HTTP-date values are not supported and yield `None`.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let seconds: f64 = value.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_millis((seconds * 1000.0).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_client_creation() {
        let client = VigilClient::new("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert!(!client.has_token());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = VigilClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = VigilClient::with_client("http://localhost:8000", http_client);
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_job_url() {
        let client = VigilClient::new("http://localhost:8000/api/");
        assert_eq!(
            client.job_url("job-42").unwrap().as_str(),
            "http://localhost:8000/api/jobs/job-42"
        );

        let client = VigilClient::new("http://localhost:8000");
        assert_eq!(
            client.job_url("job-42").unwrap().as_str(),
            "http://localhost:8000/jobs/job-42"
        );
    }

    #[test]
    fn test_job_url_escapes_reserved_characters() {
        let client = VigilClient::new("http://localhost:8000");

        let url = client.job_url("job?42#x").unwrap();
        assert_eq!(url.path(), "/jobs/job%3F42%23x");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = client.job_url("../admin").unwrap();
        assert_eq!(url.path(), "/jobs/..%2Fadmin");

        let url = client.job_url("a/b c").unwrap();
        assert_eq!(url.path(), "/jobs/a%2Fb%20c");
    }

    #[test]
    fn test_job_url_rejects_dot_segments() {
        let client = VigilClient::new("http://localhost:8000");
        assert!(matches!(
            client.job_url(".."),
            Err(ClientError::InvalidRequest(_))
        ));
        assert!(matches!(
            client.job_url("."),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_empty_token_is_dropped() {
        let client = VigilClient::new("http://localhost:8000").with_bearer_token(Some("  ".into()));
        assert!(!client.has_token());

        let client = client.with_bearer_token(Some("abc".into()));
        assert!(client.has_token());
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "job-1", None, String::new()),
            ClientError::NotFound(id) if id == "job-1"
        ));
        assert!(matches!(
            classify_status(
                StatusCode::TOO_MANY_REQUESTS,
                "job-1",
                Some(Duration::from_secs(3)),
                String::new()
            ),
            ClientError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(3)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, "job-1", None, String::new()),
            ClientError::Overloaded
        ));
        assert!(matches!(
            classify_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                "job-1",
                None,
                "boom".to_string()
            ),
            ClientError::ApiError { status: 500, message } if message == "boom"
        ));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("1.5"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_millis(1_500)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-4"));
        assert_eq!(parse_retry_after(&headers), None);
    }
}
