//! Core data models for codenav
//!
//! These structures are the values the engine hands to its callers: symbols,
//! per-file indexes, scan results and statistics snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use strum::{Display, EnumString};

/// Type of symbol found in code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "PascalCase", ascii_case_insensitive)]
pub enum SymbolKind {
    Class,
    Method,
    Function,
    Field,
    Variable,
}

impl SymbolKind {
    /// Rank used when several definitions share a name (lower wins)
    pub fn priority(self) -> u8 {
        match self {
            SymbolKind::Class => 0,
            SymbolKind::Method | SymbolKind::Function => 1,
            SymbolKind::Field => 2,
            SymbolKind::Variable => 3,
        }
    }
}

/// A named, located program element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Identifier text (never empty)
    pub name: String,
    /// Type of symbol
    pub kind: SymbolKind,
    /// Owning file
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column of the identifier (0-indexed byte offset), when the extractor knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        file: impl Into<PathBuf>,
        line: usize,
        column: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            file: file.into(),
            line,
            column,
        }
    }
}

/// Cheap proxy for "has this file's content changed": modification time plus size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub modified: SystemTime,
    pub size: u64,
}

impl Fingerprint {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            // Platforms without mtime support fall back to the epoch; size still discriminates
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            size: metadata.len(),
        }
    }

    /// Stat `path` and fingerprint it (None if it is missing or not a regular file)
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        metadata.is_file().then(|| Self::from_metadata(&metadata))
    }
}

/// Programming language identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    CSharp,
    JavaScript,
    TypeScript,
    Python,
    Go,
    Rust,
    C,
    Cpp,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "java" => Language::Java,
            "cs" => Language::CSharp,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Language::TypeScript,
            "py" | "pyi" => Language::Python,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "C" | "H" => Language::Cpp,
            _ => Language::Unknown,
        }
    }

    /// Detect the language of a path from its extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Check if this language has a built-in extractor
    pub fn is_supported(&self) -> bool {
        !matches!(self, Language::Unknown)
    }
}

/// Symbols attributed to one file plus the fingerprint they were extracted from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileIndex {
    /// File identity
    pub path: PathBuf,
    /// Detected language
    pub language: Language,
    /// Symbols in scan order
    pub symbols: Vec<Symbol>,
    /// Content fingerprint at extraction time (None when the file was absent)
    pub fingerprint: Option<Fingerprint>,
    /// Commit sequence number; later commits have larger values
    pub generation: u64,
    /// Commit timestamp
    pub indexed_at: DateTime<Utc>,
}

impl FileIndex {
    /// Same symbols, same order, same fingerprint (ignores commit bookkeeping)
    pub fn same_content(&self, other: &FileIndex) -> bool {
        self.path == other.path
            && self.symbols == other.symbols
            && self.fingerprint == other.fingerprint
    }
}

/// Outcome of a project scan
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexResult {
    /// Eligible files that were indexed (fresh or reused)
    pub files_indexed: usize,
    /// Total symbols in the indexed files
    pub symbols_found: usize,
    /// Eligible files that could not be read
    pub files_skipped: usize,
    /// Wall-clock duration in milliseconds
    pub time_millis: u64,
    /// Whether the scan stopped early because the caller cancelled it
    pub cancelled: bool,
}

/// Statistics about the symbol index
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    /// Entries in the file index table
    pub indexed_files: usize,
    /// Distinct symbol names in the global table
    pub unique_symbols: usize,
    /// Symbol instances across all files
    pub total_symbols: usize,
    /// Cumulative wall time spent in project scans
    pub total_indexing_ms: u64,
}

/// Statistics about the content cache, counted since the last `clear()`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub preload_count: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hit_count + self.miss_count;
        if lookups == 0 {
            0.0
        } else {
            self.hit_count as f64 / lookups as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entries={}, size={}, hits={}, misses={}, hitRate={:.2}%",
            self.entry_count,
            format_bytes(self.total_size),
            self.hit_count,
            self.miss_count,
            self.hit_rate() * 100.0
        )
    }
}

/// Render a byte count as B / KB / MB
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("java"), Language::Java);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("json"), Language::Unknown);
        assert!(!Language::from_path(Path::new("README")).is_supported());
        assert!(Language::from_path(Path::new("src/main.rs")).is_supported());
    }

    #[test]
    fn test_kind_priority_order() {
        assert!(SymbolKind::Class.priority() < SymbolKind::Method.priority());
        assert_eq!(SymbolKind::Method.priority(), SymbolKind::Function.priority());
        assert!(SymbolKind::Function.priority() < SymbolKind::Field.priority());
        assert!(SymbolKind::Field.priority() < SymbolKind::Variable.priority());
    }

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!(SymbolKind::from_str("class").unwrap(), SymbolKind::Class);
        assert_eq!(SymbolKind::Method.to_string(), "Method");
    }

    #[test]
    fn test_cache_stats_display() {
        let stats = CacheStats {
            entry_count: 2,
            total_size: 2048,
            hit_count: 3,
            miss_count: 1,
            preload_count: 0,
        };
        let text = stats.to_string();
        assert!(text.contains("entries=2"));
        assert!(text.contains("size=2.0 KB"));
        assert!(text.contains("hits=3"));
        assert!(text.contains("misses=1"));
        assert!(text.contains("hitRate=75.00%"));
    }
}
