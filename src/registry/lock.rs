//! The single registry lock
//!
//! Guards every `EntryStore` access. Hold it for map operations only: never
//! across a sleep, a crash action or a polling wait.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::store::EntryStore;

pub struct RegistryLock {
    inner: Mutex<EntryStore>,
}

impl RegistryLock {
    pub fn new(store: EntryStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Acquire the lock; released when the guard drops.
    ///
    /// A segment that died while holding the lock leaves it poisoned. The
    /// store is still consistent (no operation spans an unwind point), so
    /// the guard is recovered instead of wedging every other segment.
    pub fn acquire(&self) -> MutexGuard<'_, EntryStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
