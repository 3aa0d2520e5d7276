//! Active job registry
//!
//! Records which job the tracker should follow after a restart. The caller
//! activates a job before polling starts; the poller releases it on every
//! terminal outcome, but only if it still owns the slot.

use std::sync::Arc;

use super::{KeyValueStore, StoreResult};

/// Key holding the id of the job being tracked
pub const ACTIVE_JOB_KEY: &str = "active_job_id";

/// Key holding whether the tracker should be displayed
pub const SHOW_TRACKER_KEY: &str = "show_tracker";

/// Typed access to the persisted active-job reference
#[derive(Clone)]
pub struct ActiveJobRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl ActiveJobRegistry {
    /// Wraps a key/value backend
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Marks `job_id` as the job to track and shows the tracker
    pub fn activate(&self, job_id: &str) -> StoreResult<()> {
        self.store.set(ACTIVE_JOB_KEY, job_id)?;
        self.store.set(SHOW_TRACKER_KEY, "true")
    }

    /// Job currently recorded as active, if any
    pub fn active_job(&self) -> StoreResult<Option<String>> {
        Ok(self
            .store
            .get(ACTIVE_JOB_KEY)?
            .filter(|id| !id.trim().is_empty()))
    }

    /// Whether the tracker flag is set
    pub fn is_tracker_visible(&self) -> StoreResult<bool> {
        Ok(self.store.get(SHOW_TRACKER_KEY)?.as_deref() == Some("true"))
    }

    /// Clears both keys if the active job is `job_id`
    ///
    /// Returns whether anything was cleared. Another job recorded in the
    /// meantime is left alone.
    pub fn release(&self, job_id: &str) -> StoreResult<bool> {
        if self.active_job()?.as_deref() != Some(job_id) {
            return Ok(false);
        }
        self.clear()?;
        Ok(true)
    }

    /// Clears both keys unconditionally
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(ACTIVE_JOB_KEY)?;
        self.store.remove(SHOW_TRACKER_KEY)
    }
}
