//! Aggregate statistics over a run's records

use bench_core::{BenchmarkParams, IterationRecord, Phase, ShardRecord};
use serde::{Deserialize, Serialize};

/// Summary written to `checkpoint_summary.yaml`
///
/// Fields are declared in key order so the YAML output is sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub bytes_per_shard: u64,
    pub concurrency: usize,
    pub fsync_enabled: bool,
    pub iterations_scheduled: usize,
    pub mode: String,
    pub read_avg_throughput_mb_s: f64,
    pub read_iterations: usize,
    pub read_p50_sec: f64,
    pub read_p95_sec: f64,
    pub read_p99_sec: f64,
    pub read_shard_p95_sec: f64,
    pub read_shard_p99_sec: f64,
    pub retention: usize,
    pub shards_per_iteration: usize,
    pub total_bytes_read: u64,
    pub total_bytes_written: u64,
    pub write_avg_throughput_mb_s: f64,
    pub write_iterations: usize,
    pub write_p50_sec: f64,
    pub write_p95_sec: f64,
    pub write_p99_sec: f64,
    pub write_shard_p95_sec: f64,
    pub write_shard_p99_sec: f64,
}

/// Per-phase statistics; all zero when the phase never ran
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PhaseStats {
    iterations: usize,
    total_bytes: u64,
    p50_sec: f64,
    p95_sec: f64,
    p99_sec: f64,
    avg_throughput_mb_s: f64,
    shard_p95_sec: f64,
    shard_p99_sec: f64,
}

impl PhaseStats {
    fn collect(phase: Phase, iterations: &[IterationRecord], shards: &[ShardRecord]) -> Self {
        let iters: Vec<_> = iterations.iter().filter(|r| r.phase == phase).collect();
        let shard_durations: Vec<f64> = shards
            .iter()
            .filter(|r| r.phase == phase)
            .map(|r| r.duration_sec)
            .collect();

        let mut stats = PhaseStats::default();
        if !iters.is_empty() {
            let durations: Vec<f64> = iters.iter().map(|r| r.duration_sec).collect();
            let throughputs: Vec<f64> = iters.iter().map(|r| r.throughput_mb_s).collect();

            stats.iterations = iters.len();
            stats.total_bytes = iters.iter().map(|r| r.total_bytes).sum();
            stats.p50_sec = round_to(median(&durations), 6);
            stats.p95_sec = round_to(percentile(&durations, 0.95), 6);
            stats.p99_sec = round_to(percentile(&durations, 0.99), 6);
            stats.avg_throughput_mb_s = round_to(mean(&throughputs), 2);
        }
        if !shard_durations.is_empty() {
            stats.shard_p95_sec = round_to(percentile(&shard_durations, 0.95), 6);
            stats.shard_p99_sec = round_to(percentile(&shard_durations, 0.99), 6);
        }
        stats
    }
}

impl BenchmarkSummary {
    pub fn build(
        params: &BenchmarkParams,
        iterations: &[IterationRecord],
        shards: &[ShardRecord],
    ) -> Self {
        let write = PhaseStats::collect(Phase::Write, iterations, shards);
        let read = PhaseStats::collect(Phase::Read, iterations, shards);

        Self {
            bytes_per_shard: params.shard_bytes(),
            concurrency: params.concurrency,
            fsync_enabled: params.fsync,
            iterations_scheduled: params.iterations,
            mode: params.mode.to_string(),
            read_avg_throughput_mb_s: read.avg_throughput_mb_s,
            read_iterations: read.iterations,
            read_p50_sec: read.p50_sec,
            read_p95_sec: read.p95_sec,
            read_p99_sec: read.p99_sec,
            read_shard_p95_sec: read.shard_p95_sec,
            read_shard_p99_sec: read.shard_p99_sec,
            retention: params.retention,
            shards_per_iteration: params.shard_count,
            total_bytes_read: read.total_bytes,
            total_bytes_written: write.total_bytes,
            write_avg_throughput_mb_s: write.avg_throughput_mb_s,
            write_iterations: write.iterations,
            write_p50_sec: write.p50_sec,
            write_p95_sec: write.p95_sec,
            write_p99_sec: write.p99_sec,
            write_shard_p95_sec: write.shard_p95_sec,
            write_shard_p99_sec: write.shard_p99_sec,
        }
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Nearest-rank percentile: sorted[round(pct * (n - 1))]; 0 for no values
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let values = sorted(values);
    if pct <= 0.0 {
        return values[0];
    }
    if pct >= 1.0 {
        return values[values.len() - 1];
    }
    let idx = (pct * (values.len() - 1) as f64).round() as usize;
    values[idx]
}

/// Middle value, or the mean of the two middle values for even counts
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let values = sorted(values);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round to `digits` decimals; infinities pass through
pub fn round_to(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}
