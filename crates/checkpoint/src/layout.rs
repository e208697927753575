//! Checkpoint directory and shard file naming
//!
//! Names are zero-padded so lexical order equals iteration/shard order and
//! must stay bit-exact for compatibility with previously written data.

use std::path::{Path, PathBuf};

use bench_core::{Iteration, ShardId};

/// Extension of shard files
pub const SHARD_EXTENSION: &str = "ckpt";

/// `{run_name}_ckpt_{iteration:04}`
pub fn checkpoint_dir_name(run_name: &str, iteration: Iteration) -> String {
    format!("{}_ckpt_{:04}", run_name, iteration)
}

/// `shard_{shard_id:05}.ckpt`
pub fn shard_file_name(shard_id: ShardId) -> String {
    format!("shard_{:05}.{}", shard_id, SHARD_EXTENSION)
}

/// Deterministic shard paths `0..shard_count` inside `dir`
pub fn shard_paths(dir: &Path, shard_count: usize) -> Vec<PathBuf> {
    (0..shard_count)
        .map(|shard_id| dir.join(shard_file_name(shard_id)))
        .collect()
}
