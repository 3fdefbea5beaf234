//! Engine configuration
//!
//! All settings have defaults, so an empty (or absent) `codenav.toml` is valid:
//!
//! ```toml
//! [index]
//! parallel_threads = 0        # 0 = auto (80% of available cores)
//! follow_symlinks = false
//! respect_gitignore = true
//! include_hidden = false
//! exclude = ["**/node_modules/**", "**/target/**"]
//! max_file_size = 10485760    # 10 MB
//!
//! [cache]
//! max_file_size = 10485760    # 10 MB
//! max_total_bytes = 104857600 # 100 MB
//! idle_eviction_secs = 300
//!
//! [search]
//! case_sensitive = false
//! default_limit = 50
//! ```

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::IndexError;

const TEN_MB: u64 = 10 * 1024 * 1024;

/// Top-level configuration shared by the cache, the index and the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub index: IndexConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        // Reject bad globs up front rather than on first scan
        config.index.exclude_set()?;
        Ok(config)
    }
}

/// Configuration for project scans
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of worker threads (0 = auto, 80% of available cores)
    pub parallel_threads: usize,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Honour .gitignore / .ignore files
    pub respect_gitignore: bool,
    /// Walk into hidden files and directories
    pub include_hidden: bool,
    /// Glob patterns excluded from scans
    pub exclude: Vec<String>,
    /// Files larger than this are not indexed during scans (bytes)
    pub max_file_size: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            parallel_threads: 0,
            follow_symlinks: false,
            respect_gitignore: true,
            include_hidden: false,
            exclude: vec![],
            max_file_size: TEN_MB,
        }
    }
}

impl IndexConfig {
    /// Resolve the worker count
    pub fn worker_threads(&self) -> usize {
        if self.parallel_threads == 0 {
            let available_cores = num_cpus::get();
            // Use 80% of available cores (minimum 1)
            ((available_cores as f64 * 0.8).ceil() as usize).max(1)
        } else {
            self.parallel_threads
        }
    }

    /// Compile the exclude patterns
    pub fn exclude_set(&self) -> Result<GlobSet, IndexError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern)
                .map_err(|e| IndexError::Config(format!("bad exclude pattern '{}': {}", pattern, e)))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| IndexError::Config(e.to_string()))
    }
}

/// Configuration for the content cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Files larger than this are never cached and read as absent (bytes)
    pub max_file_size: u64,
    /// Total cached bytes before least-recently-used entries are evicted
    pub max_total_bytes: u64,
    /// Entries untouched for this long are dropped by `evict_idle`
    pub idle_eviction_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_file_size: TEN_MB,
            max_total_bytes: 10 * TEN_MB,
            idle_eviction_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn idle_eviction(&self) -> Duration {
        Duration::from_secs(self.idle_eviction_secs)
    }
}

/// Configuration for symbol search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub case_sensitive: bool,
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            default_limit: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.index.max_file_size, TEN_MB);
        assert_eq!(config.cache.max_total_bytes, 100 * 1024 * 1024);
        assert!(!config.search.case_sensitive);
        assert_eq!(config.search.default_limit, 50);
    }

    #[test]
    fn test_partial_sections() {
        let config = EngineConfig::from_toml(
            r#"
[index]
parallel_threads = 3
exclude = ["**/vendor/**"]

[search]
case_sensitive = true
"#,
        )
        .unwrap();
        assert_eq!(config.index.worker_threads(), 3);
        assert!(config.index.respect_gitignore);
        assert!(config.search.case_sensitive);
        assert!(config.index.exclude_set().unwrap().is_match("a/vendor/b.js"));
    }

    #[test]
    fn test_auto_threads_at_least_one() {
        assert!(IndexConfig::default().worker_threads() >= 1);
    }

    #[test]
    fn test_bad_glob_rejected() {
        let result = EngineConfig::from_toml("[index]\nexclude = [\"a[\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("codenav.toml");
        std::fs::write(&path, "[cache]\nmax_file_size = 12\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.cache.max_file_size, 12);

        assert!(EngineConfig::load(temp.path().join("missing.toml")).is_err());
    }
}
