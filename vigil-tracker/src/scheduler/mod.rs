//! Scheduler layer for the tracker
//!
//! This layer drives the polling state machine against the backend: it
//! issues one request at a time, waits out the delays the state machine
//! picks, publishes statuses and cleans up persisted state when tracking ends.

pub mod poller;

pub use poller::{JobStatusPoller, PollReport, PollerHandle, TrackerExit};
