//! Core domain types
//!
//! This module contains the structures the backend reports to the client.
//! They are read-only from the tracker's perspective: the tracker only ever
//! fetches and inspects them.

pub mod job;
