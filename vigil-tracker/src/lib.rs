//! Vigil Tracker
//!
//! Follows long-running backend jobs until they finish.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Repository: Backend access, classified into poll outcomes
//! - Store: Persisted active-job reference so tracking survives a restart
//! - Scheduler: The polling loop, its cancellation and status reporting
//!
//! The decisions themselves (delays, failure budget, termination) live in
//! `vigil_core::tracking`; this crate only executes them.

pub mod config;
pub mod context;
pub mod logging;
pub mod repository;
pub mod scheduler;
pub mod store;

pub use config::TrackerConfig;
pub use context::TrackerContext;
pub use scheduler::{JobStatusPoller, PollReport, PollerHandle, TrackerExit};
pub use store::{ActiveJobRegistry, FileStore, KeyValueStore, MemoryStore};
