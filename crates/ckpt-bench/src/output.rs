//! Report files on disk

use std::fs;
use std::io::Write;
use std::path::Path;

use bench_core::{BenchmarkParams, Error, Result};
use checkpoint::BenchmarkRecords;
use serde::Serialize;
use tracing::{debug, info};

use crate::metadata::RunMetadata;
use crate::report::{csv_line, iteration_rows, shard_rows};
use crate::summary::BenchmarkSummary;

pub const SHARDS_CSV: &str = "checkpoint_shards.csv";
pub const ITERATIONS_CSV: &str = "checkpoint_iterations.csv";
pub const SUMMARY_YAML: &str = "checkpoint_summary.yaml";
pub const METADATA_YAML: &str = "metadata.yaml";

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::Storage {
                message: format!("Failed to create directory {}: {}", parent.display(), e),
            })?;
        }
    }
    Ok(())
}

/// Write `rows` as CSV, creating parent directories as needed
pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    ensure_parent(path)?;
    let write_err = |e: std::io::Error| Error::Storage {
        message: format!("Failed to write {}: {}", path.display(), e),
    };

    let mut file = fs::File::create(path).map_err(write_err)?;
    for row in rows {
        writeln!(file, "{}", csv_line(row)).map_err(write_err)?;
    }
    file.flush().map_err(write_err)?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

/// Serialize `value` as YAML, creating parent directories as needed
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let text = serde_yaml::to_string(value)?;
    fs::write(path, text).map_err(|e| Error::Storage {
        message: format!("Failed to write {}: {}", path.display(), e),
    })?;

    debug!(path = %path.display(), "Wrote YAML");
    Ok(())
}

/// Write all four report files into `dir` and return the summary
pub fn write_reports(
    dir: &Path,
    params: &BenchmarkParams,
    records: &BenchmarkRecords,
) -> Result<BenchmarkSummary> {
    write_csv(&dir.join(SHARDS_CSV), &shard_rows(&records.shards))?;
    write_csv(&dir.join(ITERATIONS_CSV), &iteration_rows(&records.iterations))?;

    let summary = BenchmarkSummary::build(params, &records.iterations, &records.shards);
    write_yaml(&dir.join(SUMMARY_YAML), &summary)?;
    write_yaml(&dir.join(METADATA_YAML), &RunMetadata::new(params, &summary))?;

    info!(dir = %dir.display(), "Reports written");
    Ok(summary)
}
