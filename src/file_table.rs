//! File index table: one committed `FileIndex` per path
//!
//! Entries are immutable `Arc<FileIndex>` values replaced as a unit, so a
//! reader holding an entry never sees it change. Writers to one path are
//! serialized through a per-path write slot; different paths never contend.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::FileIndex;

#[derive(Default)]
pub struct FileTable {
    entries: DashMap<PathBuf, Arc<FileIndex>>,
    write_slots: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock guarding commits for `path`; hold it across read, extract and commit
    pub fn write_slot(&self, path: &Path) -> Arc<Mutex<()>> {
        if let Some(slot) = self.write_slots.get(path) {
            return Arc::clone(slot.value());
        }
        Arc::clone(
            self.write_slots
                .entry(path.to_path_buf())
                .or_default()
                .value(),
        )
    }

    /// Forget the write slot for `path` unless someone still holds it
    pub fn release_slot(&self, path: &Path) {
        self.write_slots
            .remove_if(path, |_, slot| Arc::strong_count(slot) == 1);
    }

    pub fn get(&self, path: &Path) -> Option<Arc<FileIndex>> {
        self.entries.get(path).map(|e| Arc::clone(e.value()))
    }

    /// Swap in a new entry, returning the one it replaced
    pub fn insert(&self, index: Arc<FileIndex>) -> Option<Arc<FileIndex>> {
        self.entries.insert(index.path.clone(), index)
    }

    pub fn remove(&self, path: &Path) -> Option<Arc<FileIndex>> {
        self.entries.remove(path).map(|(_, index)| index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted list of indexed paths
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.entries.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Symbol instances across all entries
    pub fn total_symbols(&self) -> usize {
        self.entries.iter().map(|e| e.value().symbols.len()).sum()
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.write_slots.len()
    }
}
