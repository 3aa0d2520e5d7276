//! Repository layer
//!
//! Repositories abstract communication with the backend. They classify
//! every response into a `PollOutcome` and carry no retry logic of their own.
//!
//! All repositories are trait-based to enable testing and mocking.

mod jobs;

// Re-export traits
pub use jobs::JobRepository;

// Re-export implementations
pub use jobs::HttpJobRepository;
