//! Fixed-capacity keyed store of fault entries
//!
//! Not synchronized; only reachable through `RegistryLock`.

use std::collections::HashMap;

use thiserror::Error;

use crate::fault::FaultEntry;

/// Why an insert was refused. The store is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entry already exists")]
    AlreadyExists,

    #[error("max slots:'{0}' reached")]
    CapacityExceeded(usize),

    #[error("no memory")]
    NoMemory,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::AlreadyExists => "FI_STORE_ALREADY_EXISTS",
            StoreError::CapacityExceeded(_) => "FI_STORE_CAPACITY_EXCEEDED",
            StoreError::NoMemory => "FI_STORE_NO_MEMORY",
        }
    }
}

/// Fault entries keyed by fault name
#[derive(Debug)]
pub struct EntryStore {
    entries: HashMap<String, FaultEntry>,
    capacity: usize,
}

impl EntryStore {
    /// Create a store that holds at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a new entry under its own name
    pub fn insert(&mut self, entry: FaultEntry) -> Result<(), StoreError> {
        if self.entries.contains_key(&entry.name) {
            return Err(StoreError::AlreadyExists);
        }
        if self.entries.len() >= self.capacity {
            return Err(StoreError::CapacityExceeded(self.capacity));
        }
        self.entries
            .try_reserve(1)
            .map_err(|_| StoreError::NoMemory)?;
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&FaultEntry> {
        self.entries.get(name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut FaultEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove an entry; `None` if it was not there
    pub fn remove(&mut self, name: &str) -> Option<FaultEntry> {
        self.entries.remove(name)
    }

    /// Remove every entry, returning them in name order
    pub fn drain(&mut self) -> Vec<FaultEntry> {
        let mut removed: Vec<_> = self.entries.drain().map(|(_, e)| e).collect();
        removed.sort_by(|a, b| a.name.cmp(&b.name));
        removed
    }

    /// Visit every entry in name order
    pub fn for_each<F: FnMut(&FaultEntry)>(&self, mut visitor: F) {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        for name in names {
            visitor(&self.entries[name]);
        }
    }
}
