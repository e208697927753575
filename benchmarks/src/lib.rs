//! Shared fixtures for the shard throughput benchmarks

use std::path::{Path, PathBuf};

use bench_core::MIB;
use checkpoint::layout::shard_file_name;
use checkpoint::ShardWriter;
use tokio::runtime::Runtime;

/// Shard sizes exercised by every group
pub const SHARD_SIZES: [u64; 3] = [MIB, 8 * MIB, 32 * MIB];

/// Write block size used by the fixtures
pub const CHUNK_BYTES: u64 = 4 * MIB;

/// Write one shard of `size` bytes into `dir` and return its path
pub fn seed_shard(rt: &Runtime, dir: &Path, size: u64) -> PathBuf {
    let path = dir.join(shard_file_name(0));
    rt.block_on(ShardWriter::new(size, CHUNK_BYTES, false).write_shard(&path))
        .expect("seed shard");
    path
}
