//! CSV tables for shard and iteration records

use bench_core::{IterationRecord, ShardRecord};

use crate::summary::round_to;

pub const SHARD_HEADER: [&str; 7] = [
    "iteration",
    "phase",
    "shard_id",
    "bytes",
    "duration_sec",
    "throughput_mb_s",
    "path",
];

pub const ITERATION_HEADER: [&str; 5] = [
    "iteration",
    "phase",
    "duration_sec",
    "total_bytes",
    "throughput_mb_s",
];

/// Header plus one row per shard record
pub fn shard_rows(records: &[ShardRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&SHARD_HEADER)];
    rows.extend(records.iter().map(|r| {
        vec![
            r.iteration.to_string(),
            r.phase.to_string(),
            r.shard_id.to_string(),
            r.bytes.to_string(),
            format_seconds(r.duration_sec),
            format_throughput(r.throughput_mb_s),
            r.path.clone(),
        ]
    }));
    rows
}

/// Header plus one row per iteration record
pub fn iteration_rows(records: &[IterationRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&ITERATION_HEADER)];
    rows.extend(records.iter().map(|r| {
        vec![
            r.iteration.to_string(),
            r.phase.to_string(),
            format_seconds(r.duration_sec),
            r.total_bytes.to_string(),
            format_throughput(r.throughput_mb_s),
        ]
    }));
    rows
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Seconds rounded to 6 decimals
pub fn format_seconds(value: f64) -> String {
    round_to(value, 6).to_string()
}

/// MiB/s rounded to 2 decimals, `inf` for an unbounded rate
pub fn format_throughput(value: f64) -> String {
    if value == f64::INFINITY {
        return "inf".to_string();
    }
    round_to(value, 2).to_string()
}

/// One CSV line; fields with separators, quotes or newlines are quoted
pub fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| {
            if field.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                field.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
