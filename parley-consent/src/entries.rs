//! Thread-safe consent entries map.
//!
//! All reads and writes go through the lock; callers never hold a guard
//! across an await point.

use parking_lot::RwLock;
use parley_types::{ConsentEntry, ConsentState, EntityKind};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key→entry map with last-write-wins upserts.
#[derive(Clone, Default)]
pub struct EntriesMap {
    entries: Arc<RwLock<BTreeMap<String, ConsentEntry>>>,
}

impl EntriesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry for `(kind, value)` and returns it.
    pub fn upsert(&self, kind: EntityKind, value: &str, state: ConsentState) -> ConsentEntry {
        let entry = ConsentEntry::new(kind, value, state);
        self.entries.write().insert(entry.key(), entry.clone());
        entry
    }

    /// Applies a batch of entries in order under a single write lock.
    pub fn apply(&self, batch: impl IntoIterator<Item = ConsentEntry>) {
        let mut entries = self.entries.write();
        for entry in batch {
            entries.insert(entry.key(), entry);
        }
    }

    pub fn get(&self, kind: EntityKind, value: &str) -> Option<ConsentEntry> {
        self.entries
            .read()
            .get(&ConsentEntry::key_for(kind, value))
            .cloned()
    }

    /// Current state, `Unknown` when the key was never touched.
    pub fn state(&self, kind: EntityKind, value: &str) -> ConsentState {
        self.get(kind, value)
            .map(|entry| entry.state)
            .unwrap_or_default()
    }

    /// Snapshot of all entries in key order.
    pub fn snapshot(&self) -> Vec<ConsentEntry> {
        self.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for EntriesMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntriesMap").field("len", &self.len()).finish()
    }
}
