//! Synthetic shard writer

use std::path::{Path, PathBuf};
use std::time::Instant;

use bench_core::{BenchmarkParams, Error, Result};
use rand::RngCore;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::throughput::{clamped_secs, MIN_SHARD_DURATION_SECS};

/// Writes one shard of random bytes and times it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardWriter {
    /// Exact size of every shard
    shard_bytes: u64,

    /// Size of each write call
    chunk_bytes: u64,

    /// Flush and sync before closing
    fsync: bool,
}

impl ShardWriter {
    /// Create a writer; `chunk_bytes` is raised to at least 1
    pub fn new(shard_bytes: u64, chunk_bytes: u64, fsync: bool) -> Self {
        Self {
            shard_bytes,
            chunk_bytes: chunk_bytes.max(1),
            fsync,
        }
    }

    /// Writer configured from run parameters
    pub fn from_params(params: &BenchmarkParams) -> Self {
        Self::new(params.shard_bytes(), params.chunk_bytes(), params.fsync)
    }

    pub fn shard_bytes(&self) -> u64 {
        self.shard_bytes
    }

    /// Write exactly `shard_bytes` bytes to `path`
    ///
    /// A single random block of `min(shard_bytes, chunk_bytes)` bytes is
    /// generated up front and written repeatedly; the last write is cut to
    /// the remaining length. Returns the duration in seconds, never below
    /// [`MIN_SHARD_DURATION_SECS`].
    #[instrument(skip(self, path), fields(path = %path.display(), bytes = self.shard_bytes))]
    pub async fn write_shard(&self, path: &Path) -> Result<f64> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Error::Storage {
                message: format!("Failed to create directory {}: {}", parent.display(), e),
            })?;
        }

        let block = random_block(self.shard_bytes.min(self.chunk_bytes) as usize);
        let write_err = |e: std::io::Error| Error::Storage {
            message: format!("Failed to write shard {}: {}", path.display(), e),
        };

        let start = Instant::now();
        let mut file = File::create(path).await.map_err(write_err)?;

        let mut remaining = self.shard_bytes;
        while remaining > 0 {
            let len = remaining.min(block.len() as u64) as usize;
            file.write_all(&block[..len]).await.map_err(write_err)?;
            remaining -= len as u64;
        }

        // Always flush so the on-disk size is final once the task returns
        file.flush().await.map_err(write_err)?;
        if self.fsync {
            file.sync_all().await.map_err(write_err)?;
        }
        drop(file);

        let duration_sec = clamped_secs(start.elapsed(), MIN_SHARD_DURATION_SECS);
        debug!(duration_sec, "Shard written");
        Ok(duration_sec)
    }

    /// Spawnable write task for one shard
    pub fn task(
        self,
        path: PathBuf,
    ) -> impl std::future::Future<Output = Result<f64>> + Send + 'static {
        async move { self.write_shard(&path).await }
    }
}

fn random_block(len: usize) -> Vec<u8> {
    let mut block = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut block);
    block
}
