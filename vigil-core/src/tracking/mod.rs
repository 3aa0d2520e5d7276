//! Job status tracking
//!
//! The polling logic is a pure state machine: each classified response is
//! applied to a [`PollerState`] and yields the next state plus a single
//! [`PollAction`] for whatever drives the loop (timer, async sleep, channel).
//! Nothing here performs I/O or reads a clock.

pub mod policy;
pub mod state;
pub mod status;

pub use policy::BackoffPolicy;
pub use state::{Completion, PollAction, PollOutcome, PollerState, Termination};
pub use status::{RetryReason, TerminalReason, TrackerStatus};
