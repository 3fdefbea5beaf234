//! File system watcher for automatic reindexing
//!
//! The watcher monitors a project root and keeps a `CodeIndex` current:
//! created and modified files are indexed again, deleted ones are cleared.
//! Changes are debounced so a burst of saves becomes one batch.
//!
//! ```text
//! t=0ms:   File A changed  [timer starts]
//! t=200ms: File B changed  [timer resets]
//! t=700ms: Timer expires   [reindex A, B]
//! ```
//!
//! Each applied batch is reported on the handle's channel.

use anyhow::{Context, Result};
use globset::GlobSet;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::indexer::CodeIndex;
use crate::models::Language;

/// Configuration for file watching
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Waits this long after the last change before reindexing
    pub debounce_ms: u64,
    /// How often the loop wakes to check the stop flag and the timer
    pub tick_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            tick_ms: 50,
        }
    }
}

/// One debounced batch of changes, after it was applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchBatch {
    pub reindexed: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub time_millis: u64,
}

/// Running watcher; dropping it stops the watcher too
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    batches: Receiver<WatchBatch>,
}

impl WatchHandle {
    /// Stop watching and wait for the loop to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Next applied batch, waiting at most `timeout`
    pub fn next_batch(&self, timeout: Duration) -> Option<WatchBatch> {
        self.batches.recv_timeout(timeout).ok()
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Watcher thread panicked");
            }
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Watch `root` recursively and keep `index` in sync with it
pub fn watch_project(
    index: CodeIndex,
    root: impl AsRef<Path>,
    config: WatchConfig,
) -> Result<WatchHandle> {
    let root = std::path::absolute(root.as_ref())
        .with_context(|| format!("Failed to resolve {}", root.as_ref().display()))?;
    let exclude = index.config().index.exclude_set()?;
    log::info!(
        "Starting file watcher for {} with {}ms debounce",
        root.display(),
        config.debounce_ms
    );

    let (event_tx, event_rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(event_tx, Config::default())
        .context("Failed to create file watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to start watching {}", root.display()))?;

    let (batch_tx, batch_rx) = mpsc::sync_channel(64);
    let stop = Arc::new(AtomicBool::new(false));
    let loop_stop = Arc::clone(&stop);
    let thread = std::thread::Builder::new()
        .name("codenav-watch".to_string())
        .spawn(move || {
            // The watcher lives as long as the loop
            let _watcher = watcher;
            let filter = ChangeFilter {
                root,
                exclude,
                index: index.clone(),
            };
            run(&index, &filter, &event_rx, &batch_tx, &loop_stop, &config);
        })
        .context("Failed to spawn watcher thread")?;

    Ok(WatchHandle {
        stop,
        thread: Some(thread),
        batches: batch_rx,
    })
}

fn run(
    index: &CodeIndex,
    filter: &ChangeFilter,
    events: &Receiver<notify::Result<Event>>,
    batches: &SyncSender<WatchBatch>,
    stop: &AtomicBool,
    config: &WatchConfig,
) {
    let mut pending: BTreeSet<PathBuf> = BTreeSet::new();
    let mut last_event_time: Option<Instant> = None;
    let debounce = Duration::from_millis(config.debounce_ms);
    let tick = Duration::from_millis(config.tick_ms.max(1));

    while !stop.load(Ordering::Relaxed) {
        match events.recv_timeout(tick) {
            Ok(Ok(event)) => {
                for path in changed_paths(&event) {
                    if filter.accepts(&path) {
                        log::debug!("Detected change: {}", path.display());
                        pending.insert(path);
                        last_event_time = Some(Instant::now());
                    }
                }
            }
            Ok(Err(e)) => log::warn!("Watch error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::info!("Watcher channel disconnected, stopping...");
                break;
            }
        }

        if last_event_time.is_some_and(|t| t.elapsed() >= debounce) && !pending.is_empty() {
            let batch = apply(index, std::mem::take(&mut pending));
            last_event_time = None;
            match batches.try_send(batch) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                Err(TrySendError::Full(_)) => log::debug!("Dropping watch batch report (no reader)"),
            }
        }
    }

    log::info!("File watcher stopped");
}

/// Reindex or clear every pending path
fn apply(index: &CodeIndex, pending: BTreeSet<PathBuf>) -> WatchBatch {
    let start = Instant::now();
    let mut batch = WatchBatch::default();
    for path in pending {
        if path.is_file() {
            index.index_file(&path);
            batch.reindexed.push(path);
        } else if index.clear_file_index(&path) {
            batch.removed.push(path);
        }
    }
    index
        .cache()
        .evict_idle(index.config().cache.idle_eviction());
    batch.time_millis = start.elapsed().as_millis() as u64;
    log::info!(
        "Reindexed {} files, removed {} in {}ms",
        batch.reindexed.len(),
        batch.removed.len(),
        batch.time_millis
    );
    batch
}

/// Paths touched by a create, modify or remove event
fn changed_paths(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => event.paths.clone(),
        _ => Vec::new(),
    }
}

/// Decides which changed paths matter to the index
struct ChangeFilter {
    root: PathBuf,
    exclude: GlobSet,
    index: CodeIndex,
}

impl ChangeFilter {
    fn accepts(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        // Skip hidden files and directories
        if relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return false;
        }
        if self.exclude.is_match(relative) || path.is_dir() {
            return false;
        }
        self.index.supports(Language::from_path(path))
    }
}
