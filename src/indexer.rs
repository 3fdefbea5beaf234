//! Code index engine
//!
//! `CodeIndex` ties the content cache, the extractors and the two tables
//! together. Single files are indexed on the caller's thread; project scans
//! run on a background thread that fans files out over a bounded rayon pool.
//!
//! Every commit for a path happens under that path's write slot, so one path
//! is never re-indexed twice at once while different paths proceed in
//! parallel.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use dashmap::DashMap;
use globset::GlobSet;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::content_cache::{CacheEntry, ContentCache, ContentSource};
use crate::error::IndexError;
use crate::file_table::FileTable;
use crate::models::{FileIndex, Fingerprint, IndexResult, IndexStats, Language, Symbol};
use crate::parsers::{self, ExtractedSymbol, SymbolExtractor};
use crate::symbol_table::SymbolTable;

struct Shared {
    config: EngineConfig,
    cache: Arc<dyn ContentSource>,
    files: FileTable,
    symbols: SymbolTable,
    /// Extractors registered at runtime; they shadow the built-in ones
    extractors: DashMap<Language, Arc<dyn SymbolExtractor>>,
    generation: AtomicU64,
    indexing_ms: AtomicU64,
}

/// Handle to an index; clones share the same tables
#[derive(Clone)]
pub struct CodeIndex {
    shared: Arc<Shared>,
}

impl Default for CodeIndex {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// What a project scan did with one file
enum ScanOutcome {
    Indexed(usize),
    Skipped,
}

impl CodeIndex {
    /// Create an index backed by a fresh `ContentCache`
    pub fn new(config: EngineConfig) -> Self {
        let cache = Arc::new(ContentCache::new(config.cache.clone()));
        Self::with_content_source(config, cache)
    }

    /// Create an index reading through an alternate content source
    pub fn with_content_source(config: EngineConfig, cache: Arc<dyn ContentSource>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                cache,
                files: FileTable::new(),
                symbols: SymbolTable::new(),
                extractors: DashMap::new(),
                generation: AtomicU64::new(0),
                indexing_ms: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn cache(&self) -> &Arc<dyn ContentSource> {
        &self.shared.cache
    }

    /// Use `extractor` for `language` from now on, replacing the built-in one
    ///
    /// Files already indexed keep their symbols until they are indexed again.
    pub fn register_extractor(&self, language: Language, extractor: Arc<dyn SymbolExtractor>) {
        log::debug!("Registered custom extractor for {:?}", language);
        self.shared.extractors.insert(language, extractor);
    }

    /// Whether files of `language` are eligible for indexing
    pub fn supports(&self, language: Language) -> bool {
        language.is_supported() || self.shared.extractors.contains_key(&language)
    }

    /// Index one file and return its new `FileIndex`
    ///
    /// Never fails: a missing or unreadable file commits an empty index. A file
    /// with no extractor for its language is not indexed at all and yields an
    /// empty, uncommitted `FileIndex`.
    pub fn index_file(&self, path: impl AsRef<Path>) -> Arc<FileIndex> {
        let path = absolute(path.as_ref());
        let language = Language::from_path(&path);
        if !self.supports(language) {
            log::debug!("Skipping {} (no extractor)", path.display());
            return Arc::new(FileIndex {
                path,
                language,
                symbols: Vec::new(),
                fingerprint: None,
                generation: 0,
                indexed_at: Utc::now(),
            });
        }

        let slot = self.shared.files.write_slot(&path);
        let _guard = slot.lock();
        match self.shared.cache.fetch(&path) {
            Ok(Some(entry)) => self.commit_entry(&path, language, &entry),
            Ok(None) => {
                log::debug!("{} is absent; committing empty index", path.display());
                self.commit(&path, language, Vec::new(), None)
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                self.commit(&path, language, Vec::new(), None)
            }
        }
    }

    /// Start scanning every eligible file under `root`
    ///
    /// Fails up front when the root is missing, not a directory, or cannot be
    /// listed. Everything after that is per-file and absorbed by the scan.
    pub fn index_project(&self, root: impl AsRef<Path>) -> Result<IndexTask> {
        let root = absolute(root.as_ref());
        if !root.exists() {
            return Err(IndexError::RootNotFound(root).into());
        }
        if !root.is_dir() {
            return Err(IndexError::NotADirectory(root).into());
        }
        std::fs::read_dir(&root).map_err(|e| IndexError::WalkFailed {
            path: root.clone(),
            source: ignore::Error::Io(e),
        })?;

        let exclude = self.shared.config.index.exclude_set()?;
        let num_threads = self.shared.config.index.worker_threads();
        log::info!(
            "Using {} threads for parallel indexing (out of {} available)",
            num_threads,
            num_cpus::get()
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("codenav-index-{}", i))
            .build()
            .map_err(IndexError::from)?;

        let progress = Arc::new(ScanProgress::default());
        let engine = self.clone();
        let scan_progress = Arc::clone(&progress);
        let handle = std::thread::Builder::new()
            .name("codenav-scan".to_string())
            .spawn(move || engine.run_scan(&root, &exclude, &pool, &scan_progress))
            .context("Failed to spawn scan thread")?;

        Ok(IndexTask { progress, handle })
    }

    /// Best definition of `name`
    pub fn find_definition(&self, name: &str) -> Option<Symbol> {
        self.shared.symbols.find_definition(name, &self.shared.files)
    }

    /// Every definition of `name`, in `find_definition` order
    pub fn definitions(&self, name: &str) -> Vec<Symbol> {
        self.shared.symbols.definitions(name, &self.shared.files)
    }

    /// Ranked substring search, at most `limit` results
    pub fn search_symbols(&self, query: &str, limit: usize) -> Vec<Symbol> {
        self.shared.symbols.search(
            query,
            limit,
            self.shared.config.search.case_sensitive,
            &self.shared.files,
        )
    }

    /// Forget a file; returns whether it was indexed
    pub fn clear_file_index(&self, path: impl AsRef<Path>) -> bool {
        let path = absolute(path.as_ref());
        let removed = {
            let slot = self.shared.files.write_slot(&path);
            let _guard = slot.lock();
            self.clear_locked(&path)
        };
        self.shared.files.release_slot(&path);
        removed
    }

    /// Committed index for a file
    pub fn file_index(&self, path: impl AsRef<Path>) -> Option<Arc<FileIndex>> {
        self.shared.files.get(&absolute(path.as_ref()))
    }

    /// Symbols of one file in scan order
    pub fn file_symbols(&self, path: impl AsRef<Path>) -> Vec<Symbol> {
        self.file_index(path)
            .map(|index| index.symbols.clone())
            .unwrap_or_default()
    }

    pub fn indexed_files(&self) -> Vec<PathBuf> {
        self.shared.files.paths()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            indexed_files: self.shared.files.len(),
            unique_symbols: self.shared.symbols.unique_names(),
            total_symbols: self.shared.files.total_symbols(),
            total_indexing_ms: self.shared.indexing_ms.load(Ordering::Relaxed),
        }
    }

    fn run_scan(
        &self,
        root: &Path,
        exclude: &GlobSet,
        pool: &rayon::ThreadPool,
        progress: &ScanProgress,
    ) -> IndexResult {
        let start = Instant::now();
        log::info!("Indexing directory: {}", root.display());

        let files = self.discover_files(root, exclude);
        progress.total.store(files.len() as u64, Ordering::Relaxed);
        log::info!("Discovered {} files to index", files.len());

        let files_indexed = AtomicUsize::new(0);
        let symbols_found = AtomicUsize::new(0);
        let files_skipped = AtomicUsize::new(0);

        pool.install(|| {
            files.par_iter().for_each(|path| {
                if progress.cancelled.load(Ordering::Relaxed) {
                    return;
                }
                match self.scan_file(path) {
                    ScanOutcome::Indexed(symbols) => {
                        files_indexed.fetch_add(1, Ordering::Relaxed);
                        symbols_found.fetch_add(symbols, Ordering::Relaxed);
                    }
                    ScanOutcome::Skipped => {
                        files_skipped.fetch_add(1, Ordering::Relaxed);
                    }
                }
                progress.done.fetch_add(1, Ordering::Relaxed);
            })
        });

        let cancelled = progress.cancelled.load(Ordering::Relaxed);
        if cancelled {
            log::info!("Scan of {} cancelled", root.display());
        } else {
            self.sweep_undiscovered(root, &files);
        }

        let time_millis = start.elapsed().as_millis() as u64;
        self.shared.indexing_ms.fetch_add(time_millis, Ordering::Relaxed);

        let result = IndexResult {
            files_indexed: files_indexed.into_inner(),
            symbols_found: symbols_found.into_inner(),
            files_skipped: files_skipped.into_inner(),
            time_millis,
            cancelled,
        };
        log::info!(
            "Indexing complete: {} files, {} symbols, {} skipped in {}ms",
            result.files_indexed,
            result.symbols_found,
            result.files_skipped,
            result.time_millis
        );
        result
    }

    /// Collect eligible files under `root`, sorted
    fn discover_files(&self, root: &Path, exclude: &GlobSet) -> Vec<PathBuf> {
        let config = &self.shared.config.index;
        let walker = WalkBuilder::new(root)
            .follow_links(config.follow_symlinks)
            .hidden(!config.include_hidden)
            .git_ignore(config.respect_gitignore)
            .git_global(config.respect_gitignore)
            .git_exclude(config.respect_gitignore)
            .ignore(config.respect_gitignore)
            .parents(config.respect_gitignore)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Walk error under {}: {}", root.display(), e);
                    continue;
                }
            };

            // Only process files (not directories)
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if self.should_index(root, path, exclude) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files
    }

    fn should_index(&self, root: &Path, path: &Path, exclude: &GlobSet) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude.is_match(relative) {
            log::trace!("Skipping {} (excluded)", path.display());
            return false;
        }

        if !self.supports(Language::from_path(path)) {
            return false;
        }

        match std::fs::metadata(path) {
            Ok(metadata) if metadata.len() > self.shared.config.index.max_file_size => {
                log::debug!(
                    "Skipping {} (too large: {} bytes)",
                    path.display(),
                    metadata.len()
                );
                false
            }
            _ => true,
        }
    }

    fn scan_file(&self, path: &Path) -> ScanOutcome {
        let outcome = {
            let slot = self.shared.files.write_slot(path);
            let _guard = slot.lock();
            self.scan_locked(path)
        };
        if matches!(outcome, ScanOutcome::Skipped) {
            self.shared.files.release_slot(path);
        }
        outcome
    }

    /// Index one discovered file, reusing its entry when the fingerprint is unchanged
    fn scan_locked(&self, path: &Path) -> ScanOutcome {
        if let Some(existing) = self.shared.files.get(path) {
            if existing.fingerprint.is_some() && existing.fingerprint == Fingerprint::of(path) {
                log::debug!("Skipping unchanged file: {}", path.display());
                return ScanOutcome::Indexed(existing.symbols.len());
            }
        }

        match self.shared.cache.fetch(path) {
            Ok(Some(entry)) => {
                let index = self.commit_entry(path, Language::from_path(path), &entry);
                ScanOutcome::Indexed(index.symbols.len())
            }
            Ok(None) => {
                log::debug!("{} vanished before it could be read", path.display());
                self.clear_locked(path);
                ScanOutcome::Skipped
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                self.clear_locked(path);
                ScanOutcome::Skipped
            }
        }
    }

    /// Clear entries under `root` that the scan did not discover
    ///
    /// Covers deleted files as well as files that still exist but are no
    /// longer eligible (excluded, ignored, hidden or too large).
    fn sweep_undiscovered(&self, root: &Path, discovered: &[PathBuf]) {
        let discovered: HashSet<&Path> = discovered.iter().map(PathBuf::as_path).collect();
        let mut removed = 0;
        for path in self.shared.files.paths() {
            if path.starts_with(root)
                && !discovered.contains(path.as_path())
                && self.clear_file_index(&path)
            {
                log::debug!("Dropped {} (no longer eligible)", path.display());
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("Removed {} stale files from the index", removed);
        }
    }

    fn commit_entry(&self, path: &Path, language: Language, entry: &CacheEntry) -> Arc<FileIndex> {
        let symbols = self
            .extract(language, &entry.text())
            .into_iter()
            .filter(|s| !s.name.is_empty())
            .map(|s| s.into_symbol(path))
            .collect::<Vec<_>>();
        log::debug!("Extracted {} symbols from {}", symbols.len(), path.display());
        for symbol in &symbols {
            log::trace!("  {} {} at line {}", symbol.kind, symbol.name, symbol.line);
        }
        self.commit(path, language, symbols, Some(entry.fingerprint()))
    }

    /// Run the extractor for `language`; a panicking extractor yields nothing
    fn extract(&self, language: Language, content: &str) -> Vec<ExtractedSymbol> {
        let custom = self
            .shared
            .extractors
            .get(&language)
            .map(|e| Arc::clone(e.value()));
        let result = match &custom {
            Some(extractor) => panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(content))),
            None => match parsers::extractor_for(language) {
                Some(extractor) => panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(content))),
                None => return Vec::new(),
            },
        };
        result.unwrap_or_else(|_| {
            log::warn!("Extractor for {:?} panicked; indexing with no symbols", language);
            Vec::new()
        })
    }

    /// Publish a new `FileIndex`; caller holds the path's write slot
    fn commit(
        &self,
        path: &Path,
        language: Language,
        symbols: Vec<Symbol>,
        fingerprint: Option<Fingerprint>,
    ) -> Arc<FileIndex> {
        let index = Arc::new(FileIndex {
            path: path.to_path_buf(),
            language,
            symbols,
            fingerprint,
            generation: self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1,
            indexed_at: Utc::now(),
        });

        // New references stay hidden until the file table points at `index`
        self.shared.symbols.insert_file(&index);
        if let Some(previous) = self.shared.files.insert(Arc::clone(&index)) {
            self.shared.symbols.remove_file(&previous);
        }
        index
    }

    /// Remove a file from both tables; caller holds the path's write slot
    fn clear_locked(&self, path: &Path) -> bool {
        self.shared.cache.invalidate(path);
        match self.shared.files.remove(path) {
            Some(previous) => {
                self.shared.symbols.remove_file(&previous);
                log::debug!("Cleared index for {}", path.display());
                true
            }
            None => false,
        }
    }
}

#[derive(Default)]
struct ScanProgress {
    cancelled: AtomicBool,
    done: AtomicU64,
    total: AtomicU64,
}

/// A project scan running in the background
pub struct IndexTask {
    progress: Arc<ScanProgress>,
    handle: JoinHandle<IndexResult>,
}

impl IndexTask {
    /// Stop dispatching files; in-flight files still finish and commit
    pub fn cancel(&self) {
        self.progress.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.progress.cancelled.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// (files attempted, files discovered); the total is 0 until discovery ends
    pub fn progress(&self) -> (u64, u64) {
        (
            self.progress.done.load(Ordering::Relaxed),
            self.progress.total.load(Ordering::Relaxed),
        )
    }

    /// Block until the scan finishes
    pub fn wait(self) -> Result<IndexResult> {
        self.handle
            .join()
            .map_err(|_| anyhow!("project scan thread panicked"))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymbolKind;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_index_file_class_and_method() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "A.java", "class Foo { method bar() {} }");
        let index = CodeIndex::default();

        let file = index.index_file(&path);
        let found: Vec<_> = file.symbols.iter().map(|s| (s.name.as_str(), s.kind)).collect();
        assert_eq!(found, vec![("Foo", SymbolKind::Class), ("bar", SymbolKind::Method)]);

        assert_eq!(index.find_definition("Foo").unwrap().kind, SymbolKind::Class);
        assert_eq!(index.search_symbols("Fo", 10)[0].name, "Foo");
    }

    #[test]
    fn test_missing_file_commits_empty_index() {
        let temp = TempDir::new().unwrap();
        let index = CodeIndex::default();

        let file = index.index_file(temp.path().join("Missing.java"));
        assert!(file.symbols.is_empty());
        assert!(file.fingerprint.is_none());
        assert_eq!(index.stats().indexed_files, 1);
    }

    #[test]
    fn test_unsupported_language_not_committed() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "styles.css", ".class { color: red; }");
        let index = CodeIndex::default();

        assert!(index.index_file(&path).symbols.is_empty());
        assert_eq!(index.stats().indexed_files, 0);
        assert_eq!(index.cache().stats().miss_count, 0);
    }

    #[test]
    fn test_reindex_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "Test.java", "public class Test { int count; void run() {} }");
        let index = CodeIndex::default();

        let first = index.index_file(&path);
        let second = index.index_file(&path);
        assert!(first.same_content(&second));
        assert!(second.generation > first.generation);
        assert_eq!(index.stats().indexed_files, 1);
        assert_eq!(index.definitions("Test").len(), 1);
    }

    #[test]
    fn test_clear_file_index() {
        let temp = TempDir::new().unwrap();
        let a = write(&temp, "A.java", "class Shared {}\nclass OnlyA {}\n");
        let b = write(&temp, "B.java", "class Shared {}\n");
        let index = CodeIndex::default();
        index.index_file(&a);
        index.index_file(&b);

        assert!(index.clear_file_index(&a));
        assert!(!index.clear_file_index(&a));
        assert!(index.find_definition("OnlyA").is_none());
        assert_eq!(index.find_definition("Shared").unwrap().file, b);
        assert!(index.file_symbols(&a).is_empty());
    }

    #[test]
    fn test_custom_extractor_replaces_builtin() {
        struct FirstWord;
        impl SymbolExtractor for FirstWord {
            fn extract(&self, content: &str) -> Vec<ExtractedSymbol> {
                content
                    .split_whitespace()
                    .next()
                    .map(|w| vec![ExtractedSymbol::new(w, SymbolKind::Variable, 1, 0)])
                    .unwrap_or_default()
            }
        }

        let temp = TempDir::new().unwrap();
        let path = write(&temp, "notes.txt", "hello world");
        let index = CodeIndex::default();
        index.register_extractor(Language::Unknown, Arc::new(FirstWord));

        let file = index.index_file(&path);
        assert_eq!(file.symbols.len(), 1);
        assert_eq!(file.symbols[0].name, "hello");
    }

    #[test]
    fn test_panicking_extractor_yields_empty_index() {
        struct Broken;
        impl SymbolExtractor for Broken {
            fn extract(&self, _content: &str) -> Vec<ExtractedSymbol> {
                panic!("bad input");
            }
        }

        let temp = TempDir::new().unwrap();
        let path = write(&temp, "Test.java", "class Test {}");
        let index = CodeIndex::default();
        index.register_extractor(Language::Java, Arc::new(Broken));

        let file = index.index_file(&path);
        assert!(file.symbols.is_empty());
        assert_eq!(index.stats().indexed_files, 1);
    }

    #[test]
    fn test_project_root_errors() {
        let temp = TempDir::new().unwrap();
        let index = CodeIndex::default();

        let err = index.index_project(temp.path().join("nope")).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::RootNotFound(_))
        ));

        let file = write(&temp, "plain.java", "class A {}");
        let err = index.index_project(&file).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_project_scan_reuses_unchanged_files() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "src/App.java", "class App { void main() {} }");
        let index = CodeIndex::default();

        let first = index.index_project(temp.path()).unwrap().wait().unwrap();
        assert_eq!(first.files_indexed, 1);
        assert_eq!(first.symbols_found, 2);
        let generation = index.file_index(&path).unwrap().generation;

        let second = index.index_project(temp.path()).unwrap().wait().unwrap();
        assert_eq!(second.files_indexed, 1);
        assert_eq!(second.symbols_found, 2);
        assert_eq!(index.file_index(&path).unwrap().generation, generation);
    }

    #[test]
    fn test_exclude_patterns() {
        let temp = TempDir::new().unwrap();
        write(&temp, "src/Main.java", "class Main {}");
        write(&temp, "vendor/Lib.java", "class Lib {}");
        let mut config = EngineConfig::default();
        config.index.exclude = vec!["vendor/**".to_string()];
        let index = CodeIndex::new(config);

        let result = index.index_project(temp.path()).unwrap().wait().unwrap();
        assert_eq!(result.files_indexed, 1);
        assert!(index.find_definition("Lib").is_none());
    }

    #[test]
    fn test_clear_releases_write_slot() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "Gone.java", "class Gone {}");
        let index = CodeIndex::default();
        index.index_file(&path);
        assert_eq!(index.shared.files.slot_count(), 1);

        assert!(index.clear_file_index(&path));
        assert_eq!(index.shared.files.slot_count(), 0);

        // Clearing a path that was never indexed leaves nothing behind
        assert!(!index.clear_file_index(temp.path().join("Never.java")));
        assert_eq!(index.shared.files.slot_count(), 0);
    }

    /// Serves current bytes under a fingerprint that never matches the disk
    struct StaleSource {
        fetches: AtomicUsize,
    }

    impl StaleSource {
        fn fingerprint(size: u64) -> Fingerprint {
            Fingerprint {
                modified: std::time::SystemTime::UNIX_EPOCH,
                size,
            }
        }
    }

    impl ContentSource for StaleSource {
        fn fetch(&self, path: &Path) -> std::io::Result<Option<Arc<CacheEntry>>> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            let bytes = std::fs::read(path)?;
            let fingerprint = Self::fingerprint(bytes.len() as u64);
            Ok(Some(Arc::new(CacheEntry::new(path, bytes, fingerprint))))
        }

        fn preload(&self, _path: &Path) -> bool {
            false
        }

        fn invalidate(&self, _path: &Path) {}

        fn clear(&self) {}

        fn evict_idle(&self, _max_idle: std::time::Duration) -> usize {
            0
        }

        fn stats(&self) -> crate::models::CacheStats {
            crate::models::CacheStats::default()
        }
    }

    #[test]
    fn test_commit_keeps_fingerprint_of_bytes_read() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "Racy.java", "class Racy {}");
        let source = Arc::new(StaleSource {
            fetches: AtomicUsize::new(0),
        });
        let index = CodeIndex::with_content_source(EngineConfig::default(), source.clone());

        let file = index.index_file(&path);
        let expected = StaleSource::fingerprint("class Racy {}".len() as u64);
        assert_eq!(file.fingerprint, Some(expected));
        assert_ne!(file.fingerprint, Fingerprint::of(&path));

        // The mismatch forces the next scan to read the file again
        let result = index.index_project(temp.path()).unwrap().wait().unwrap();
        assert_eq!(result.files_indexed, 1);
        assert_eq!(source.fetches.load(Ordering::Relaxed), 2);
        assert!(index.find_definition("Racy").is_some());
    }
}
