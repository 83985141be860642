//! Storage layer
//!
//! Whole-document JSON persistence with atomic writes, the startup repair
//! pass, typed storage errors, and the per-database lock registry.

pub mod error;
pub mod locks;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use locks::LockRegistry;
