//! Checkpoint I/O benchmark core
//!
//! Writes synthetic checkpoints as shard files, optionally reads them back,
//! and measures per-shard and per-phase throughput while bounding how many
//! checkpoint directories stay on disk.

pub mod benchmark;
pub mod layout;
pub mod pool;
pub mod reader;
pub mod retention;
pub mod throughput;
pub mod writer;

pub use benchmark::{BenchmarkRecords, CheckpointBenchmark};
pub use pool::{PoolOutput, ShardPool};
pub use reader::{ShardRead, ShardReader};
pub use retention::RetentionPolicy;
pub use throughput::throughput_mb_s;
pub use writer::ShardWriter;
