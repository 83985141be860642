//! Per-database serialization
//!
//! Every operation is a whole-document read-modify-write cycle; two of them
//! interleaved on the same database would lose the first write. The engine
//! therefore holds one mutex per database name for the duration of each
//! cycle. The connection record gets its own slot, keyed by its file name.
//!
//! In-process only. Exclusion across OS processes is out of scope.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Lazily populated map from database name to its lock.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for a database name, created on first use.
    ///
    /// Callers hold the returned mutex for the whole read-modify-write
    /// cycle, not just the individual file operations.
    pub fn for_database(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(name.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_lock() {
        let registry = LockRegistry::new();
        let a = registry.for_database("shop");
        let b = registry.for_database("shop");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_names_different_locks() {
        let registry = LockRegistry::new();
        let a = registry.for_database("shop");
        let b = registry.for_database("crm");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_lock_is_usable() {
        let registry = LockRegistry::new();
        let lock = registry.for_database("shop");
        let guard = lock.lock().unwrap();
        drop(guard);
        // Re-acquirable after release
        assert!(lock.try_lock().is_ok());
    }
}
