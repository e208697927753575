//! Storage - Filesystem backends for the checkpoint benchmark
//!
//! Covers the directory lifecycle around shard I/O: creating checkpoint
//! directories, discovering existing ones, resolving shard files, querying
//! sizes and removing directories.
//!
//! # Example
//!
//! ```no_run
//! use storage::{LocalStorage, StorageBackend};
//!
//! # async fn example() -> bench_core::Result<()> {
//! let storage = LocalStorage::new("/tmp/checkpoints");
//! let dir = storage.create_dir("run_ckpt_0001").await?;
//! let existing = storage.list_dirs().await?;
//! storage.remove_dir(&dir).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod local;

pub use backend::StorageBackend;
pub use local::LocalStorage;
