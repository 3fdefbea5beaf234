//! Read-through file content cache
//!
//! Maps a path to its bytes, keyed by a modification-time + size fingerprint.
//! Every lookup stats the file; when the fingerprint still matches, the cached
//! bytes are returned without touching the file contents again.
//!
//! # Concurrency
//!
//! Each path owns a slot (`Arc<Mutex<Slot>>`) stored in a sharded `DashMap`.
//! The check-then-reload sequence runs under the slot's lock, so two readers
//! of the same changed file reload it once and never observe a half-built
//! entry. Different paths only share a map shard for the instant it takes to
//! clone the slot handle.
//!
//! Lock order: a slot lock is never acquired while a map guard is held.
//! Whole-cache operations (stats aside) snapshot the slot handles first.
//!
//! An invalidated slot is marked `retired` before it leaves the map, so a
//! reader that was queued on it retries against the map instead of filling
//! an orphan.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::models::{CacheStats, Fingerprint};

/// Content source consumed by the index engine
///
/// Any replacement must keep the freshness contract: a lookup after the file
/// changed on disk returns the new content, and the entry's fingerprint is the
/// one observed before the bytes were read.
pub trait ContentSource: Send + Sync {
    /// Fresh entry for `path`; `Ok(None)` when the file does not exist
    fn fetch(&self, path: &Path) -> io::Result<Option<Arc<CacheEntry>>>;

    /// Force a read and entry creation, counted apart from hits and misses
    fn preload(&self, path: &Path) -> bool;

    /// Drop one entry
    fn invalidate(&self, path: &Path);

    /// Drop every entry and reset the counters
    fn clear(&self);

    /// Drop entries not read for `max_idle`; returns how many were dropped
    fn evict_idle(&self, max_idle: Duration) -> usize;

    fn stats(&self) -> CacheStats;

    /// Text content, decoded lossily when the file is not UTF-8
    fn get(&self, path: &Path) -> Option<Arc<str>> {
        match self.fetch(path) {
            Ok(entry) => entry.map(|e| e.text()),
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Raw bytes
    fn get_bytes(&self, path: &Path) -> Option<Arc<[u8]>> {
        match self.fetch(path) {
            Ok(entry) => entry.map(|e| e.bytes()),
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Cached content of one file
#[derive(Debug)]
pub struct CacheEntry {
    path: PathBuf,
    bytes: Arc<[u8]>,
    text: OnceLock<Arc<str>>,
    fingerprint: Fingerprint,
}

impl CacheEntry {
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>, fingerprint: Fingerprint) -> Self {
        Self {
            path: path.into(),
            bytes: Arc::from(bytes),
            text: OnceLock::new(),
            fingerprint,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Decoded once, then shared
    pub fn text(&self) -> Arc<str> {
        Arc::clone(
            self.text
                .get_or_init(|| Arc::from(String::from_utf8_lossy(&self.bytes).as_ref())),
        )
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

struct Slot {
    entry: Option<Arc<CacheEntry>>,
    last_access: Instant,
    retired: bool,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            entry: None,
            last_access: Instant::now(),
            retired: false,
        }
    }
}

type SlotHandle = Arc<Mutex<Slot>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Query,
    Preload,
}

/// The default `ContentSource`: an in-memory read-through cache
pub struct ContentCache {
    slots: DashMap<PathBuf, SlotHandle>,
    entries: AtomicUsize,
    total_size: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    preloads: AtomicU64,
    config: CacheConfig,
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ContentCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            slots: DashMap::new(),
            entries: AtomicUsize::new(0),
            total_size: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            preloads: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lookup(&self, path: &Path, access: Access) -> io::Result<Option<Arc<CacheEntry>>> {
        let current = match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => Fingerprint::from_metadata(&metadata),
            Ok(_) => {
                self.absent(path, access);
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.absent(path, access);
                return Ok(None);
            }
            Err(e) => {
                self.absent(path, access);
                return Err(e);
            }
        };

        if current.size > self.config.max_file_size {
            log::debug!(
                "File too large for cache: {} ({} bytes)",
                path.display(),
                current.size
            );
            self.absent(path, access);
            return Ok(None);
        }

        loop {
            let slot = self.slot(path);
            let mut state = slot.lock();
            if state.retired {
                continue;
            }

            if access == Access::Query {
                if let Some(entry) = &state.entry {
                    if entry.fingerprint == current {
                        let entry = Arc::clone(entry);
                        state.last_access = Instant::now();
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        log::debug!("Content cache HIT: {}", path.display());
                        return Ok(Some(entry));
                    }
                    log::debug!("Content cache STALE: {}", path.display());
                }
            }

            self.count(access);
            return match read_consistent(path) {
                Ok(Some(entry)) if entry.size() <= self.config.max_file_size => {
                    let entry = Arc::new(entry);
                    let loaded = entry.size();
                    match state.entry.replace(Arc::clone(&entry)) {
                        Some(previous) => {
                            self.total_size.fetch_sub(previous.size(), Ordering::Relaxed);
                        }
                        None => {
                            self.entries.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    self.total_size.fetch_add(loaded, Ordering::Relaxed);
                    state.last_access = Instant::now();
                    drop(state);

                    log::debug!("Content cache LOAD: {} ({} bytes)", path.display(), loaded);
                    self.enforce_budget(path);
                    Ok(Some(entry))
                }
                Ok(_) => {
                    self.retire(path, &slot, &mut state);
                    Ok(None)
                }
                Err(e) => {
                    self.retire(path, &slot, &mut state);
                    Err(e)
                }
            };
        }
    }

    fn slot(&self, path: &Path) -> SlotHandle {
        Arc::clone(self.slots.entry(path.to_path_buf()).or_default().value())
    }

    fn snapshot(&self) -> Vec<(PathBuf, SlotHandle)> {
        self.slots
            .iter()
            .map(|item| (item.key().clone(), Arc::clone(item.value())))
            .collect()
    }

    fn count(&self, access: Access) {
        match access {
            Access::Query => self.misses.fetch_add(1, Ordering::Relaxed),
            Access::Preload => self.preloads.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn absent(&self, path: &Path, access: Access) {
        self.count(access);
        self.invalidate(path);
    }

    /// Empty the slot and unlink it from the map; caller holds the slot lock
    fn retire(&self, path: &Path, slot: &SlotHandle, state: &mut Slot) {
        if let Some(entry) = state.entry.take() {
            self.entries.fetch_sub(1, Ordering::Relaxed);
            self.total_size.fetch_sub(entry.size(), Ordering::Relaxed);
        }
        state.retired = true;
        self.slots.remove_if(path, |_, current| Arc::ptr_eq(current, slot));
    }

    fn enforce_budget(&self, keep: &Path) {
        if self.total_size.load(Ordering::Relaxed) <= self.config.max_total_bytes {
            return;
        }

        let mut candidates: Vec<(Instant, PathBuf, SlotHandle)> = self
            .snapshot()
            .into_iter()
            .filter(|(path, _)| path.as_path() != keep)
            .filter_map(|(path, slot)| {
                let last_access = {
                    let state = slot.lock();
                    state.entry.as_ref()?;
                    state.last_access
                };
                Some((last_access, path, slot))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut evicted = 0;
        for (_, path, slot) in candidates {
            if self.total_size.load(Ordering::Relaxed) <= self.config.max_total_bytes {
                break;
            }
            let mut state = slot.lock();
            if !state.retired && state.entry.is_some() {
                self.retire(&path, &slot, &mut state);
                evicted += 1;
            }
        }
        log::debug!("Evicted {} least-recently-used cache entries", evicted);
    }
}

impl ContentSource for ContentCache {
    fn fetch(&self, path: &Path) -> io::Result<Option<Arc<CacheEntry>>> {
        self.lookup(path, Access::Query)
    }

    fn preload(&self, path: &Path) -> bool {
        match self.lookup(path, Access::Preload) {
            Ok(entry) => entry.is_some(),
            Err(e) => {
                log::warn!("Failed to preload {}: {}", path.display(), e);
                false
            }
        }
    }

    fn invalidate(&self, path: &Path) {
        let Some(slot) = self.slots.get(path).map(|item| Arc::clone(item.value())) else {
            return;
        };
        let mut state = slot.lock();
        if !state.retired {
            self.retire(path, &slot, &mut state);
            log::debug!("Invalidated cache for: {}", path.display());
        }
    }

    fn clear(&self) {
        for (path, slot) in self.snapshot() {
            let mut state = slot.lock();
            if !state.retired {
                self.retire(&path, &slot, &mut state);
            }
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.preloads.store(0, Ordering::Relaxed);
        log::info!("Content cache cleared");
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        for (path, slot) in self.snapshot() {
            let mut state = slot.lock();
            if state.entry.is_some() && state.last_access.elapsed() >= max_idle {
                self.retire(&path, &slot, &mut state);
                evicted += 1;
            }
        }
        if evicted > 0 {
            log::debug!("Evicted {} idle cache entries", evicted);
        }
        evicted
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.load(Ordering::Relaxed),
            total_size: self.total_size.load(Ordering::Relaxed),
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
            preload_count: self.preloads.load(Ordering::Relaxed),
        }
    }
}

/// Read a file so that the returned fingerprint describes bytes no newer than it
///
/// The file is stat'ed before and after reading. If it changed underneath us we
/// retry once; after that we keep the pre-read fingerprint, which will not match
/// the disk on the next lookup and so forces another reload.
fn read_consistent(path: &Path) -> io::Result<Option<CacheEntry>> {
    let mut attempt = 0;
    loop {
        let Some(before) = stat(path)? else {
            return Ok(None);
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let after = stat(path)?;

        attempt += 1;
        if after == Some(before) || attempt >= 2 {
            if after != Some(before) {
                log::debug!(
                    "{} changed while being read; keeping pre-read fingerprint",
                    path.display()
                );
            }
            return Ok(Some(CacheEntry::new(path, bytes, before)));
        }
        log::debug!("{} changed while being read; retrying", path.display());
    }
}

fn stat(path: &Path) -> io::Result<Option<Fingerprint>> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(Some(Fingerprint::from_metadata(&metadata))),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_miss_then_hit() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "test.txt", "Test content");
        let cache = ContentCache::default();

        assert_eq!(cache.get(&path).as_deref(), Some("Test content"));
        let stats = cache.stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 0);

        assert_eq!(cache.get(&path).as_deref(), Some("Test content"));
        let stats = cache.stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.total_size, "Test content".len() as u64);
    }

    #[test]
    fn test_modified_file_is_reloaded() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "test.txt", "Test content");
        let cache = ContentCache::default();

        cache.get(&path);
        // Different length, so the fingerprint changes even on coarse mtime clocks
        std::fs::write(&path, "Modified content, longer").unwrap();

        assert_eq!(cache.get(&path).as_deref(), Some("Modified content, longer"));
        let stats = cache.stats();
        assert_eq!(stats.miss_count, 2);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.total_size, "Modified content, longer".len() as u64);
    }

    #[test]
    fn test_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        let cache = ContentCache::default();

        assert!(cache.get(&temp.path().join("nonexistent.txt")).is_none());
        assert!(cache.fetch(&temp.path().join("nonexistent.txt")).unwrap().is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_directory_is_absent() {
        let temp = TempDir::new().unwrap();
        let cache = ContentCache::default();
        assert!(cache.get(temp.path()).is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_deleted_file_drops_entry() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "gone.txt", "soon gone");
        let cache = ContentCache::default();

        cache.get(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(cache.get(&path).is_none());
        assert_eq!(cache.stats().entry_count, 0);
        assert_eq!(cache.stats().total_size, 0);
    }

    #[test]
    fn test_preload_counts_separately() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "test.txt", "Test content");
        let cache = ContentCache::default();

        assert!(cache.preload(&path));
        let stats = cache.stats();
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.preload_count, 1);
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);

        assert_eq!(cache.get(&path).as_deref(), Some("Test content"));
        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 0);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let temp = TempDir::new().unwrap();
        let a = write(&temp, "a.txt", "aaa");
        let b = write(&temp, "b.txt", "bbbb");
        let cache = ContentCache::default();

        cache.get(&a);
        cache.get(&b);
        cache.get(&b);
        assert_eq!(cache.stats().entry_count, 2);

        cache.invalidate(&a);
        assert_eq!(cache.stats().entry_count, 1);
        assert_eq!(cache.stats().total_size, 4);

        // Invalidating an unknown path is a no-op
        cache.invalidate(&temp.path().join("never.txt"));

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());

        // Entries come back as misses after a clear
        cache.get(&b);
        assert_eq!(cache.stats().miss_count, 1);
    }

    #[test]
    fn test_get_bytes_shares_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.bin");
        std::fs::write(&path, [0xffu8, 0x00, 0x41]).unwrap();
        let cache = ContentCache::default();

        assert_eq!(cache.get_bytes(&path).as_deref(), Some(&[0xffu8, 0x00, 0x41][..]));
        // Text view of the same entry is a hit and decodes lossily
        let text = cache.get(&path).unwrap();
        assert!(text.ends_with('A'));
        assert_eq!(cache.stats().hit_count, 1);
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn test_oversized_file_not_cached() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "big.txt", "0123456789");
        let cache = ContentCache::new(CacheConfig {
            max_file_size: 4,
            ..CacheConfig::default()
        });

        assert!(cache.get(&path).is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_total_budget_evicts_least_recent() {
        let temp = TempDir::new().unwrap();
        let a = write(&temp, "a.txt", "aaaaa");
        let b = write(&temp, "b.txt", "bbbbb");
        let c = write(&temp, "c.txt", "ccccc");
        let cache = ContentCache::new(CacheConfig {
            max_total_bytes: 10,
            ..CacheConfig::default()
        });

        cache.get(&a);
        std::thread::sleep(Duration::from_millis(5));
        cache.get(&b);
        std::thread::sleep(Duration::from_millis(5));
        cache.get(&c);

        let stats = cache.stats();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.total_size, 10);

        // `a` was the oldest, so it is a miss again
        cache.get(&b);
        assert_eq!(cache.stats().hit_count, 1);
    }

    #[test]
    fn test_evict_idle() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "idle.txt", "zzz");
        let cache = ContentCache::default();

        cache.get(&path);
        assert_eq!(cache.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(cache.evict_idle(Duration::ZERO), 1);
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_concurrent_readers_load_once() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "shared.txt", "shared content");
        let cache = Arc::new(ContentCache::default());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                let path = path.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    cache.get(&path).unwrap().to_string()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "shared content");
        }
        let stats = cache.stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 7);
        assert_eq!(stats.entry_count, 1);
    }

    #[test]
    fn test_read_consistent_fingerprint_matches_disk() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "steady.txt", "steady");

        let entry = read_consistent(&path).unwrap().unwrap();
        assert_eq!(Some(entry.fingerprint()), stat(&path).unwrap());
        assert_eq!(&*entry.bytes(), b"steady");
        assert!(read_consistent(&temp.path().join("missing.txt")).unwrap().is_none());
    }
}
