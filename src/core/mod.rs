//! Core modules of the record validation engine.
//!
//! Everything here is pure computation over already-fetched inputs: the
//! engine never performs platform I/O and retains no state between runs.

pub mod artifact;
pub mod authz;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod proposal;
pub mod reconcile;
pub mod record;
pub mod rules;
pub mod snapshot;
pub mod verdict;
