//! Tracker configuration
//!
//! Defines all configurable parameters for job tracking including the
//! backend URL, request timeout, backoff limits and where tracker state is kept.

use std::path::PathBuf;
use std::time::Duration;

use vigil_core::tracking::BackoffPolicy;

use crate::store::FileStore;

/// Tracker configuration
///
/// Timeouts and intervals are configurable to allow tuning for different
/// deployment scenarios (local backend vs. a remote, throttled one).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub api_url: String,

    /// Bearer token issued by the auth service
    pub auth_token: Option<String>,

    /// Client-side limit on a single status request
    pub request_timeout: Duration,

    /// Delays and failure budget applied between polls
    pub policy: BackoffPolicy,

    /// File holding the persisted active-job reference
    pub state_path: PathBuf,
}

impl TrackerConfig {
    /// Creates a new configuration with defaults
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            auth_token: None,
            request_timeout: Duration::from_secs(10),
            policy: BackoffPolicy::default(),
            state_path: FileStore::default_path(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - VIGIL_API_URL (required)
    /// - VIGIL_API_TOKEN (optional)
    /// - VIGIL_REQUEST_TIMEOUT (optional, seconds, default: 10)
    /// - VIGIL_POLL_INTERVAL_MS (optional, default: 2000)
    /// - VIGIL_MAX_FAILURES (optional, default: 3)
    /// - VIGIL_STATE_FILE (optional, default: <data dir>/vigil/tracker.json)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables read through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if non_empty(&lookup, "VIGIL_API_URL").is_none() {
            anyhow::bail!("VIGIL_API_URL environment variable not set");
        }

        Self::default().with_env_overrides(lookup)
    }

    /// Overrides fields with whichever `VIGIL_*` variables `lookup` returns
    ///
    /// Unset or empty variables keep the current value. Malformed numbers are
    /// an error rather than a silent fallback to the default.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(api_url) = non_empty(&lookup, "VIGIL_API_URL") {
            self.api_url = api_url;
        }

        if let Some(token) = non_empty(&lookup, "VIGIL_API_TOKEN") {
            self.auth_token = Some(token);
        }

        if let Some(timeout) = env_parse::<u64>(&lookup, "VIGIL_REQUEST_TIMEOUT")? {
            self.request_timeout = Duration::from_secs(timeout);
        }

        if let Some(interval) = env_parse::<u64>(&lookup, "VIGIL_POLL_INTERVAL_MS")? {
            self.policy.base_delay = Duration::from_millis(interval);
        }

        if let Some(max_failures) = env_parse::<u32>(&lookup, "VIGIL_MAX_FAILURES")? {
            self.policy.max_failures = max_failures;
        }

        if let Some(path) = non_empty(&lookup, "VIGIL_STATE_FILE") {
            self.state_path = PathBuf::from(path);
        }

        Ok(self)
    }

    /// Sets the bearer token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Sets the state file location
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.policy.base_delay.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.policy.max_failures == 0 {
            anyhow::bail!("max_failures must be greater than 0");
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000".to_string())
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(lookup, name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("invalid {} value {:?}: {}", name, value, e))
        })
        .transpose()
}
