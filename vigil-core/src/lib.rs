//! Vigil Core
//!
//! Core types and abstractions for the Vigil job tracker.
//!
//! This crate contains:
//! - Domain types: Backend entities as seen by the client (Job, JobStatus)
//! - Tracking: The pure polling state machine and the statuses it reports

pub mod domain;
pub mod tracking;
