//! Global symbol table: name -> files that define it
//!
//! Buckets reference committed `FileIndex` values rather than holding copies
//! of their symbols. Queries use the buckets only to find candidate files,
//! then read each candidate's current entry from the `FileTable` once and
//! match against that snapshot. A query therefore sees every symbol of one
//! version of a file, never a mixture of two.
//!
//! Commit order for a file:
//!
//! 1. `insert_file(new)`: references to the new entry land in their buckets
//! 2. `FileTable::insert(new)`: the new entry becomes current
//! 3. `remove_file(old)`: references to the old entry are dropped

use dashmap::DashMap;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::file_table::FileTable;
use crate::models::{FileIndex, Symbol};

#[derive(Default)]
pub struct SymbolTable {
    names: DashMap<String, Vec<Arc<FileIndex>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference `file` from the bucket of every name it defines
    pub fn insert_file(&self, file: &Arc<FileIndex>) {
        for name in distinct_names(file) {
            self.names.entry(name).or_default().push(Arc::clone(file));
        }
    }

    /// Drop the references to `file`, and any bucket left empty
    pub fn remove_file(&self, file: &Arc<FileIndex>) {
        for name in distinct_names(file) {
            if let Some(mut bucket) = self.names.get_mut(&name) {
                bucket.retain(|f| !Arc::ptr_eq(f, file));
            }
            self.names.remove_if(&name, |_, files| files.is_empty());
        }
    }

    /// Definitions of `name`: kind priority, then newest commit, then scan order
    pub fn definitions(&self, name: &str, files: &FileTable) -> Vec<Symbol> {
        let Some(candidates) = self.names.get(name).map(|b| b.value().clone()) else {
            return Vec::new();
        };

        let snapshots = current_entries(candidates, files);
        let mut found: Vec<(u8, Reverse<u64>, usize, &Symbol)> = Vec::new();
        for file in &snapshots {
            for (slot, symbol) in file.symbols.iter().enumerate() {
                if symbol.name == name {
                    found.push((symbol.kind.priority(), Reverse(file.generation), slot, symbol));
                }
            }
        }
        found.sort_by_key(|&(priority, generation, slot, _)| (priority, generation, slot));
        found.into_iter().map(|(.., symbol)| symbol.clone()).collect()
    }

    pub fn find_definition(&self, name: &str, files: &FileTable) -> Option<Symbol> {
        self.definitions(name, files).into_iter().next()
    }

    /// Substring search over names, ranked exact > prefix > interior
    pub fn search(
        &self,
        query: &str,
        limit: usize,
        case_sensitive: bool,
        files: &FileTable,
    ) -> Vec<Symbol> {
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let needle = fold(query, case_sensitive);

        // Gather candidates first so no bucket guard is held while reading the file table
        let mut candidates: Vec<Arc<FileIndex>> = Vec::new();
        for bucket in self.names.iter() {
            if match_rank(&fold(bucket.key(), case_sensitive), &needle).is_some() {
                candidates.extend(bucket.value().iter().cloned());
            }
        }

        let snapshots = current_entries(candidates, files);
        let mut found: Vec<(u8, &Symbol)> = snapshots
            .iter()
            .flat_map(|file| file.symbols.iter())
            .filter_map(|symbol| {
                match_rank(&fold(&symbol.name, case_sensitive), &needle).map(|rank| (rank, symbol))
            })
            .collect();
        found.sort_by(|(rank_a, a), (rank_b, b)| {
            rank_a
                .cmp(rank_b)
                .then(a.kind.priority().cmp(&b.kind.priority()))
                .then(a.name.len().cmp(&b.name.len()))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.file.cmp(&b.file))
                .then(a.line.cmp(&b.line))
                .then(a.column.cmp(&b.column))
        });
        found
            .into_iter()
            .take(limit)
            .map(|(_, symbol)| symbol.clone())
            .collect()
    }

    /// Distinct names in the table
    pub fn unique_names(&self) -> usize {
        self.names.len()
    }
}

/// One current entry per candidate path; paths no longer indexed are dropped
fn current_entries(candidates: Vec<Arc<FileIndex>>, files: &FileTable) -> Vec<Arc<FileIndex>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    candidates
        .into_iter()
        .filter(|file| seen.insert(file.path.clone()))
        .filter_map(|file| files.get(&file.path))
        .collect()
}

fn distinct_names(file: &FileIndex) -> BTreeSet<String> {
    file.symbols.iter().map(|s| s.name.clone()).collect()
}

fn fold(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

fn match_rank(name: &str, needle: &str) -> Option<u8> {
    if name == needle {
        Some(0)
    } else if name.starts_with(needle) {
        Some(1)
    } else if name.contains(needle) {
        Some(2)
    } else {
        None
    }
}
