//! Test helper functions shared by the integration suites

#![allow(dead_code)]

use codenav::{CodeIndex, EngineConfig, IndexResult, Symbol, SymbolKind};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tempfile::TempDir;

static CORPUS: OnceLock<(CodeIndex, IndexResult)> = OnceLock::new();

pub fn corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/corpus")
}

/// Index the test corpus once and share the index between tests
pub fn corpus() -> &'static (CodeIndex, IndexResult) {
    CORPUS.get_or_init(|| {
        let index = CodeIndex::new(EngineConfig::default());
        let result = index
            .index_project(corpus_path())
            .expect("Failed to start corpus scan")
            .wait()
            .expect("Corpus scan failed");
        (index, result)
    })
}

/// Write `content` to `relative` under `dir`, creating parent directories
pub fn write_file(dir: &TempDir, relative: &str, content: &str) -> PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Scan `root` with a default index and wait for the result
pub fn index_dir(root: &Path) -> (CodeIndex, IndexResult) {
    let index = CodeIndex::default();
    let result = index.index_project(root).unwrap().wait().unwrap();
    (index, result)
}

/// Assert that a symbol with the given name and kind is present
pub fn assert_symbol(symbols: &[Symbol], name: &str, kind: SymbolKind) {
    assert!(
        symbols.iter().any(|s| s.name == name && s.kind == kind),
        "Expected to find symbol '{}' of kind {:?}, got {:?}",
        name,
        kind,
        names(symbols)
    );
}

pub fn names(symbols: &[Symbol]) -> Vec<&str> {
    symbols.iter().map(|s| s.name.as_str()).collect()
}

/// Poll `condition` until it holds or `timeout` passes
pub fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    condition()
}
