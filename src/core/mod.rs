//! Core business logic.
//!
//! Every data-access function takes any [`crate::storage::StorageAdapter`],
//! re-reads the snapshot, and hands its writes to the adapter as one batch of
//! changes. Nothing is cached between calls.

pub mod access;
pub mod announcement;
pub mod backup;
pub mod media;
pub mod module;
pub mod progress;
pub mod settings;
pub mod stats;
pub mod user;
