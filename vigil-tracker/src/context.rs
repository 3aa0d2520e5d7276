//! Tracker context
//!
//! Wires configuration into the pieces every tracking session needs:
//! - Backend client carrying the bearer token
//! - Job repository over that client
//! - Registry over the persisted tracker state

use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};
use reqwest::Client;
use tokio::time::Duration;
use vigil_client::VigilClient;

use crate::config::TrackerConfig;
use crate::repository::{HttpJobRepository, JobRepository};
use crate::scheduler::JobStatusPoller;
use crate::store::{ActiveJobRegistry, FileStore, KeyValueStore};

/// Shared state for tracking jobs against one backend
#[derive(Clone)]
pub struct TrackerContext {
    config: TrackerConfig,
    client: Arc<VigilClient>,
    repository: Arc<dyn JobRepository>,
    registry: ActiveJobRegistry,
}

impl TrackerContext {
    /// Builds a context backed by the state file named in `config`
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.state_path.clone()));
        Self::with_store(config, store)
    }

    /// Builds a context over an arbitrary store backend
    pub fn with_store(config: TrackerConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;

        let client = Arc::new(
            VigilClient::with_client(config.api_url.clone(), http_client)
                .with_bearer_token(config.auth_token.clone()),
        );

        if !client.has_token() {
            tracing::debug!("No API token configured; requests are sent unauthenticated");
        }

        let repository: Arc<dyn JobRepository> =
            Arc::new(HttpJobRepository::new(Arc::clone(&client)));

        Ok(Self {
            config,
            client,
            repository,
            registry: ActiveJobRegistry::new(store),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn client(&self) -> &VigilClient {
        &self.client
    }

    pub fn registry(&self) -> &ActiveJobRegistry {
        &self.registry
    }

    /// Creates a poller for `job_id` sharing this context's client and store
    pub fn poller(&self, job_id: impl Into<String>) -> JobStatusPoller {
        JobStatusPoller::new(
            job_id,
            Arc::clone(&self.repository),
            self.registry.clone(),
            &self.config,
        )
    }
}
