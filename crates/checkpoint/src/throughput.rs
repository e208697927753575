//! Throughput and duration helpers

use std::time::Duration;

use bench_core::MIB;

/// Lower bound for a single shard's measured duration
pub const MIN_SHARD_DURATION_SECS: f64 = 1e-9;

/// Lower bound for a phase's wall-clock span
pub const MIN_PHASE_DURATION_SECS: f64 = 1e-6;

/// MiB per second for `bytes` moved in `duration_sec`
///
/// Returns `f64::INFINITY` when the duration is zero or negative.
pub fn throughput_mb_s(bytes: u64, duration_sec: f64) -> f64 {
    if duration_sec <= 0.0 {
        return f64::INFINITY;
    }
    (bytes as f64 / MIB as f64) / duration_sec
}

/// Seconds of `elapsed`, never below `floor`
pub fn clamped_secs(elapsed: Duration, floor: f64) -> f64 {
    elapsed.as_secs_f64().max(floor)
}
