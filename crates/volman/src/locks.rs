//! Per-key mutual exclusion for check-then-act sequences.
//!
//! Only serializes work inside one process; two service instances sharing a
//! host can still race.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async mutexes created on demand, one per key.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: impl Into<String>) -> KeyGuard {
        let key = key.into();
        let mutex = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        let guard = mutex.lock_owned().await;
        KeyGuard {
            key,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no keys are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds a key's lock; releases it and forgets idle keys on drop.
#[derive(Debug)]
pub struct KeyGuard {
    key: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map still references the mutex: nobody is waiting.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
