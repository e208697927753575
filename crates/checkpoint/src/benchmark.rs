//! Checkpoint benchmark orchestrator
//!
//! Drives the per-iteration write and read phases, owns the list of
//! directories the run created, and applies retention after every write.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bench_core::{
    BenchmarkParams, Error, Iteration, IterationRecord, Phase, Result, ShardRecord,
};
use storage::{LocalStorage, StorageBackend};
use tracing::{debug, info, instrument};

use crate::layout::{checkpoint_dir_name, shard_paths};
use crate::pool::ShardPool;
use crate::reader::{resolve_shard_paths, ShardReader};
use crate::retention::{remove_best_effort, RetentionPolicy};
use crate::throughput::throughput_mb_s;
use crate::writer::ShardWriter;

/// Everything a run measured, in execution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkRecords {
    /// Per-shard records: write shards then read shards, iteration by iteration
    pub shards: Vec<ShardRecord>,

    /// Per-phase aggregates in the same order
    pub iterations: Vec<IterationRecord>,
}

impl BenchmarkRecords {
    fn push_phase(&mut self, (shards, iteration): (Vec<ShardRecord>, IterationRecord)) {
        self.shards.extend(shards);
        self.iterations.push(iteration);
    }
}

/// Sharded checkpoint write/read benchmark
pub struct CheckpointBenchmark {
    /// Run parameters
    params: BenchmarkParams,

    /// Directory lifecycle backend rooted at `params.root`
    storage: Arc<dyn StorageBackend>,

    /// Retention over `created`
    retention: RetentionPolicy,

    /// Directories this run created, oldest first
    created: VecDeque<PathBuf>,
}

impl fmt::Debug for CheckpointBenchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointBenchmark")
            .field("params", &self.params)
            .field("storage_root", &self.storage.root())
            .field("retention", &self.retention)
            .field("created", &self.created)
            .finish()
    }
}

impl CheckpointBenchmark {
    /// Create a benchmark over an explicit storage backend
    ///
    /// Fails with `InvalidConfig` if any parameter is out of range.
    pub fn new(params: BenchmarkParams, storage: Arc<dyn StorageBackend>) -> Result<Self> {
        params.validate()?;
        let retention = RetentionPolicy::new(params.retention);

        Ok(Self {
            params,
            storage,
            retention,
            created: VecDeque::new(),
        })
    }

    /// Create a benchmark over the local filesystem at `params.root`
    pub fn with_local_storage(params: BenchmarkParams) -> Result<Self> {
        let storage = Arc::new(LocalStorage::new(&params.root));
        Self::new(params, storage)
    }

    /// Directories created by this run that are still retained
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.created.iter().cloned().collect()
    }

    /// Run every iteration and return the collected records
    ///
    /// Phases and iterations run strictly one after another. Any shard or
    /// directory I/O failure aborts the run; only retention and cleanup
    /// deletions are best-effort.
    pub async fn run(&mut self) -> Result<BenchmarkRecords> {
        let mode = self.params.mode;
        let (do_write, do_read) = (mode.writes(), mode.reads());

        info!(
            run_name = %self.params.run_name,
            root = %self.params.root.display(),
            %mode,
            iterations = self.params.iterations,
            shard_count = self.params.shard_count,
            shard_bytes = self.params.shard_bytes(),
            concurrency = self.params.concurrency,
            fsync = self.params.fsync,
            retention = self.params.retention,
            "Starting checkpoint benchmark"
        );

        let read_targets = if do_read && !do_write {
            self.discover_read_targets().await?
        } else {
            Vec::new()
        };

        let mut records = BenchmarkRecords::default();

        for iteration in 1..=self.params.iterations {
            let checkpoint_dir = if do_write {
                let dir = self
                    .storage
                    .create_dir(&checkpoint_dir_name(&self.params.run_name, iteration))
                    .await?;
                self.created.push_back(dir.clone());

                records.push_phase(self.write_phase(&dir, iteration).await?);

                let trimmed = self
                    .retention
                    .trim(&mut self.created, self.storage.as_ref())
                    .await;
                if !trimmed.is_empty() {
                    debug!(
                        iteration,
                        trimmed = trimmed.len(),
                        retained = self.created.len(),
                        "Applied retention"
                    );
                }
                dir
            } else {
                read_targets[iteration - 1].clone()
            };

            if do_read {
                records.push_phase(self.read_phase(&checkpoint_dir, iteration).await?);
            }
        }

        if self.params.cleanup_after {
            self.cleanup().await;
        }

        info!(
            shard_records = records.shards.len(),
            iteration_records = records.iterations.len(),
            "Checkpoint benchmark complete"
        );
        Ok(records)
    }

    /// First `iterations` existing directories under the root, in name order
    async fn discover_read_targets(&self) -> Result<Vec<PathBuf>> {
        let mut existing = self.storage.list_dirs().await?;
        let required = self.params.iterations;

        if existing.len() < required {
            return Err(Error::InsufficientCheckpoints {
                required,
                found: existing.len(),
                root: self.storage.root().to_path_buf(),
            });
        }

        existing.truncate(required);
        debug!(targets = existing.len(), "Resolved read-only checkpoint directories");
        Ok(existing)
    }

    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    async fn write_phase(
        &self,
        dir: &Path,
        iteration: Iteration,
    ) -> Result<(Vec<ShardRecord>, IterationRecord)> {
        let writer = ShardWriter::from_params(&self.params);
        let shard_bytes = writer.shard_bytes();
        let paths = shard_paths(dir, self.params.shard_count);

        let tasks: Vec<_> = paths
            .iter()
            .cloned()
            .map(|path| writer.task(path))
            .collect();
        let output = ShardPool::new(self.params.concurrency).run(tasks).await?;

        let shards: Vec<_> = output
            .results
            .into_iter()
            .zip(paths)
            .enumerate()
            .map(|(shard_id, (duration_sec, path))| ShardRecord {
                iteration,
                phase: Phase::Write,
                shard_id,
                bytes: shard_bytes,
                duration_sec,
                throughput_mb_s: throughput_mb_s(shard_bytes, duration_sec),
                path: path.display().to_string(),
            })
            .collect();

        let total_bytes = shard_bytes * self.params.shard_count as u64;
        let record = phase_record(iteration, Phase::Write, output.elapsed_sec, total_bytes);
        Ok((shards, record))
    }

    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    async fn read_phase(
        &self,
        dir: &Path,
        iteration: Iteration,
    ) -> Result<(Vec<ShardRecord>, IterationRecord)> {
        let reader = ShardReader::from_params(&self.params);
        let paths =
            resolve_shard_paths(self.storage.as_ref(), dir, self.params.shard_count).await?;

        let tasks: Vec<_> = paths
            .iter()
            .cloned()
            .map(|path| reader.task(Arc::clone(&self.storage), path))
            .collect();
        let output = ShardPool::new(self.params.concurrency).run(tasks).await?;

        let shards: Vec<_> = output
            .results
            .into_iter()
            .zip(paths)
            .enumerate()
            .map(|(shard_id, (read, path))| ShardRecord {
                iteration,
                phase: Phase::Read,
                shard_id,
                bytes: read.bytes,
                duration_sec: read.duration_sec,
                throughput_mb_s: throughput_mb_s(read.bytes, read.duration_sec),
                path: path.display().to_string(),
            })
            .collect();

        let total_bytes = shards.iter().map(|s| s.bytes).sum();
        let record = phase_record(iteration, Phase::Read, output.elapsed_sec, total_bytes);
        Ok((shards, record))
    }

    /// Best-effort removal of every directory this run still owns
    async fn cleanup(&self) {
        for dir in &self.created {
            remove_best_effort(self.storage.as_ref(), dir).await;
        }
        info!(removed = self.created.len(), "Cleaned up run directories");
    }
}

fn phase_record(
    iteration: Iteration,
    phase: Phase,
    duration_sec: f64,
    total_bytes: u64,
) -> IterationRecord {
    let record = IterationRecord {
        iteration,
        phase,
        duration_sec,
        total_bytes,
        throughput_mb_s: throughput_mb_s(total_bytes, duration_sec),
    };
    info!(
        iteration,
        %phase,
        duration_sec,
        total_bytes,
        throughput_mb_s = record.throughput_mb_s,
        "Phase complete"
    );
    record
}
