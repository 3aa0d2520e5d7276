//! Configuration module
//!
//! Handles CLI configuration and turns it into tracker settings. Environment
//! variables are read once by [`TrackerConfig::with_env_overrides`]; flags
//! given on the command line take precedence over them.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use vigil_tracker::{TrackerConfig, TrackerContext};

/// CLI configuration
///
/// Every field is an override; `None` leaves the environment or default value.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// URL of the backend API
    pub api_url: Option<String>,
    /// Bearer token, if any
    pub token: Option<String>,
    /// Overrides the default state file location
    pub state_file: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_failures: Option<u32>,
}

impl Config {
    /// Tracker settings from the environment, then the command line
    pub fn tracker_config(&self) -> Result<TrackerConfig> {
        let base = TrackerConfig::default()
            .with_env_overrides(|name| std::env::var(name).ok())
            .context("Invalid VIGIL_* environment variable")?;
        Ok(self.apply_to(base))
    }

    /// Applies the flags that were given on top of `config`
    fn apply_to(&self, mut config: TrackerConfig) -> TrackerConfig {
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if self.token.is_some() {
            config = config.with_token(self.token.clone());
        }
        if let Some(path) = &self.state_file {
            config = config.with_state_path(path.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.poll_interval_ms {
            config.policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(max_failures) = self.max_failures {
            config.policy.max_failures = max_failures;
        }
        config
    }

    /// Validated tracker context
    pub fn context(&self) -> Result<TrackerContext> {
        TrackerContext::new(self.tracker_config()?)
    }
}
