//! Sequential shard reader

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bench_core::{BenchmarkParams, Error, Result};
use storage::StorageBackend;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, warn};

use crate::layout::{shard_paths, SHARD_EXTENSION};
use crate::throughput::{clamped_secs, MIN_SHARD_DURATION_SECS};

/// Outcome of reading one shard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShardRead {
    /// On-disk size of the file, as reported by the storage backend
    pub bytes: u64,

    /// Read duration in seconds, never below [`MIN_SHARD_DURATION_SECS`]
    pub duration_sec: f64,
}

/// Reads one shard front to back and times it
///
/// Content is discarded; only timing and size are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardReader {
    buffer_bytes: usize,
}

impl ShardReader {
    /// Create a reader; `buffer_bytes` is raised to at least 1
    pub fn new(buffer_bytes: u64) -> Self {
        Self {
            buffer_bytes: buffer_bytes.max(1) as usize,
        }
    }

    /// Reader configured from run parameters
    pub fn from_params(params: &BenchmarkParams) -> Self {
        Self::new(params.read_buffer_bytes())
    }

    /// Read `path` to the end, then size it through `storage`
    #[instrument(skip(self, storage, path), fields(path = %path.display()))]
    pub async fn read_shard(
        &self,
        storage: &dyn StorageBackend,
        path: &Path,
    ) -> Result<ShardRead> {
        let read_err = |e: std::io::Error| Error::Storage {
            message: format!("Failed to read shard {}: {}", path.display(), e),
        };
        let mut buf = vec![0u8; self.buffer_bytes];

        let start = Instant::now();
        let mut file = File::open(path).await.map_err(read_err)?;
        while file.read(&mut buf).await.map_err(read_err)? > 0 {}
        drop(file);
        let duration_sec = clamped_secs(start.elapsed(), MIN_SHARD_DURATION_SECS);

        let bytes = storage.file_size(path).await?;
        debug!(bytes, duration_sec, "Shard read");

        Ok(ShardRead {
            bytes,
            duration_sec,
        })
    }

    /// Spawnable read task for one shard
    pub fn task(
        self,
        storage: Arc<dyn StorageBackend>,
        path: PathBuf,
    ) -> impl std::future::Future<Output = Result<ShardRead>> + Send + 'static {
        async move { self.read_shard(storage.as_ref(), &path).await }
    }
}

/// Shard files to read from `dir`
///
/// Every `*.ckpt` file in name order; if there are none, the deterministic
/// writer paths for `shard_count` shards.
pub async fn resolve_shard_paths(
    storage: &dyn StorageBackend,
    dir: &Path,
    shard_count: usize,
) -> Result<Vec<PathBuf>> {
    let found = storage.list_files(dir, SHARD_EXTENSION).await?;
    if !found.is_empty() {
        return Ok(found);
    }

    warn!(
        dir = %dir.display(),
        shard_count,
        "No shard files found, falling back to default shard names"
    );
    Ok(shard_paths(dir, shard_count))
}
