//! Engine-level failures
//!
//! Only conditions that abort a whole operation live here. Per-file trouble
//! (missing, unreadable, unsupported, odd content) is absorbed by the engine.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("project root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("project root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to walk {path}: {source}")]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("failed to build indexing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
