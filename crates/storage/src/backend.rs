//! Storage backend trait definition
//!
//! Defines the async interface the checkpoint orchestrator uses for
//! everything except the shard byte streams themselves.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bench_core::Result;

/// Async trait for storage backends
///
/// A backend is rooted at one directory. Directory names passed in are
/// relative to that root; returned paths are full paths.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Root directory of this backend
    fn root(&self) -> &Path;

    /// Create a directory (and any missing parents) under the root
    ///
    /// # Returns
    /// The full path of the directory
    async fn create_dir(&self, name: &str) -> Result<PathBuf>;

    /// List the immediate subdirectories of the root, sorted by name
    ///
    /// A missing root yields an empty list.
    async fn list_dirs(&self) -> Result<Vec<PathBuf>>;

    /// List regular files in `dir` with the given extension, sorted by name
    ///
    /// A missing directory yields an empty list.
    async fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>>;

    /// Remove a directory and everything under it
    async fn remove_dir(&self, dir: &Path) -> Result<()>;

    /// Size in bytes of the file at `path`
    async fn file_size(&self, path: &Path) -> Result<u64>;
}
