//! Shared fault registry
//!
//! One `FaultRegistry` is constructed by the host bootstrap and shared (as
//! `Arc<FaultRegistry>`) with every segment worker and with the control
//! surface. All entry reads and writes go through the single registry lock.
//!
//! The live-slot counter mirrors the number of stored entries. It is only
//! written with the lock held, but it is read without the lock by the
//! trigger fast path.

mod lock;
mod store;

pub use lock::RegistryLock;
pub use store::{EntryStore, StoreError};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::MutexGuard;

use crate::config::FaultInjectorConfig;
use crate::fault::{DdlStatement, FaultEntry, FaultKind};
use crate::observability::{log_event_with_fields, Event};

/// The registry handle shared by segments and controllers
pub struct FaultRegistry {
    lock: RegistryLock,
    live_slots: AtomicUsize,
    config: FaultInjectorConfig,
}

impl FaultRegistry {
    /// Create an empty registry sized by `config.max_slots`
    pub fn new(config: FaultInjectorConfig) -> Self {
        let registry = Self {
            lock: RegistryLock::new(EntryStore::new(config.max_slots)),
            live_slots: AtomicUsize::new(0),
            config,
        };
        log_event_with_fields(
            Event::RegistryInitialized,
            &[("max_slots", &registry.config.max_slots.to_string())],
        );
        registry
    }

    pub fn config(&self) -> &FaultInjectorConfig {
        &self.config
    }

    /// Number of armed faults
    pub fn live_slots(&self) -> usize {
        self.live_slots.load(Ordering::Acquire)
    }

    /// Lock-free emptiness check; may be stale by one concurrent arm.
    pub fn is_probably_empty(&self) -> bool {
        self.live_slots.load(Ordering::Relaxed) == 0
    }

    /// Copy of one entry, if armed
    pub fn snapshot(&self, name: &str) -> Option<FaultEntry> {
        self.lock().lookup(name).cloned()
    }

    /// Copies of every entry, in name order
    pub fn entries(&self) -> Vec<FaultEntry> {
        let store = self.lock();
        let mut entries = Vec::with_capacity(store.len());
        store.for_each(|e| entries.push(e.clone()));
        entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Current kind of an armed fault; suspended segments poll this.
    pub fn armed_kind(&self, name: &str) -> Option<FaultKind> {
        self.lock().lookup(name).map(|e| e.kind)
    }

    /// Match one call against the fault `name`, count it and advance the
    /// entry's state, all under the lock.
    ///
    /// Returns a snapshot of the entry if the fault fires on this call.
    pub fn match_and_advance(
        &self,
        name: &str,
        ddl: DdlStatement,
        database: &str,
        table: &str,
    ) -> Option<FaultEntry> {
        let mut store = self.lock();
        let entry = store.lookup_mut(name)?;

        if !entry.matches_scope(ddl, database, table) {
            return None;
        }
        if !entry.record_match() {
            return None;
        }
        Some(entry.clone())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, EntryStore> {
        self.lock.acquire()
    }

    /// Insert with the lock held; capacity is judged by the live-slot count.
    pub(crate) fn insert_locked(
        &self,
        store: &mut EntryStore,
        entry: FaultEntry,
    ) -> Result<(), StoreError> {
        if self.live_slots.load(Ordering::Relaxed) >= self.config.max_slots {
            return Err(StoreError::CapacityExceeded(self.config.max_slots));
        }
        store.insert(entry)?;
        self.live_slots.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Remove with the lock held
    pub(crate) fn remove_locked(&self, store: &mut EntryStore, name: &str) -> Option<FaultEntry> {
        let removed = store.remove(name);
        if removed.is_some() {
            self.live_slots.fetch_sub(1, Ordering::Release);
        }
        removed
    }

    /// Remove everything with the lock held
    pub(crate) fn drain_locked(&self, store: &mut EntryStore) -> Vec<FaultEntry> {
        let removed = store.drain();
        self.live_slots.fetch_sub(removed.len(), Ordering::Release);
        debug_assert_eq!(self.live_slots.load(Ordering::Relaxed), 0);
        removed
    }
}

impl Default for FaultRegistry {
    fn default() -> Self {
        Self::new(FaultInjectorConfig::default())
    }
}

/// Log the removal of entries; call after releasing the lock.
pub(crate) fn log_removed(removed: &[FaultEntry]) {
    for entry in removed {
        log_event_with_fields(
            Event::FaultRemoved,
            &[
                ("fault_name", &entry.name),
                ("fault_type", entry.kind.as_str()),
            ],
        );
    }
}
