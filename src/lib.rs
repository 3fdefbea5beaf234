//! codenav: symbol index and file content cache for editor navigation
//!
//! codenav scans source files with fast per-language heuristics, keeps a
//! per-file symbol table plus a global name index, and answers "go to
//! definition" and "search symbols" queries while indexing continues in the
//! background.
//!
//! # Architecture
//!
//! - **Content cache**: read-through file cache keyed by mtime + size
//! - **Extractors**: per-language heuristic scanners (`parsers`)
//! - **File table / symbol table**: per-file entries and the name index
//! - **Engine**: `CodeIndex`, which coordinates all of the above
//! - **Watcher**: keeps an index current as files change
//!
//! # Example Usage
//!
//! ```no_run
//! use codenav::{CodeIndex, EngineConfig};
//!
//! let index = CodeIndex::new(EngineConfig::default());
//! let result = index.index_project(".")?.wait()?;
//! println!("Indexed {} files", result.files_indexed);
//!
//! if let Some(symbol) = index.find_definition("main") {
//!     println!("{}:{}", symbol.file.display(), symbol.line);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod content_cache;
pub mod error;
pub mod file_table;
pub mod indexer;
pub mod models;
pub mod output;
pub mod parsers;
pub mod symbol_table;
pub mod watcher;

// Re-export commonly used types
pub use config::EngineConfig;
pub use content_cache::{CacheEntry, ContentCache, ContentSource};
pub use error::IndexError;
pub use indexer::{CodeIndex, IndexTask};
pub use models::{CacheStats, FileIndex, IndexResult, IndexStats, Language, Symbol, SymbolKind};
pub use parsers::{ExtractedSymbol, SymbolExtractor};
pub use watcher::{watch_project, WatchBatch, WatchConfig, WatchHandle};
