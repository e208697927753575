//! Command-line flags and YAML overlay

use std::path::PathBuf;

use bench_core::config::parse_flag;
use bench_core::{BenchmarkParams, ConfigFile, Mode, Result};
use clap::Parser;

/// Sharded checkpoint write/read benchmark
#[derive(Debug, Clone, Parser)]
#[command(name = "ckpt-bench", version, about, allow_negative_numbers = true)]
pub struct Args {
    /// YAML file whose keys override the flags below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Prefix of the checkpoint directories and name of the report folder
    #[arg(long, default_value = "cpb-run")]
    pub run_name: String,

    /// Directory that holds the checkpoint directories
    #[arg(long, default_value = "./data/checkpoints")]
    pub storage_root: PathBuf,

    #[arg(long, default_value_t = 3)]
    pub iterations: i64,

    #[arg(long, default_value_t = 8)]
    pub shard_count: i64,

    #[arg(long, default_value_t = 16.0)]
    pub shard_size_mb: f64,

    /// Shards in flight per phase
    #[arg(long, default_value_t = 4)]
    pub concurrency: i64,

    /// write, read or write-read
    #[arg(long, default_value = "write-read")]
    pub mode: String,

    /// Run-created directories kept on disk (0 keeps all)
    #[arg(long, default_value_t = 2)]
    pub retention: i64,

    /// Sync every shard to stable storage (1/true/yes/y/on)
    #[arg(long, default_value = "false")]
    pub fsync: String,

    /// Write block size in MiB
    #[arg(long, default_value_t = 4.0)]
    pub chunk_mb: f64,

    /// Read block size in KiB
    #[arg(long, default_value_t = 1024)]
    pub read_buffer_kb: i64,

    /// Delete the run's checkpoint directories when done (1/true/yes/y/on)
    #[arg(long, default_value = "false")]
    pub cleanup_after: String,

    /// Report directory; reports land in <outdir>/<run-name>
    #[arg(long, default_value = "metrics")]
    pub outdir: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Flags after the YAML overlay, clamping and mode parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArgs {
    pub params: BenchmarkParams,
    pub outdir: PathBuf,
}

impl ResolvedArgs {
    /// `<outdir>/<run_name>`
    pub fn report_dir(&self) -> PathBuf {
        self.outdir.join(&self.params.run_name)
    }
}

impl Args {
    /// Load `--config` if given and resolve the run parameters
    pub fn resolve(&self) -> Result<ResolvedArgs> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        self.resolve_with(&file)
    }

    /// Overlay `file` on the flags and clamp numeric fields
    pub fn resolve_with(&self, file: &ConfigFile) -> Result<ResolvedArgs> {
        let bench = &file.benchmark;

        let run_name = file.run.name.clone().unwrap_or_else(|| self.run_name.clone());
        let root = file.storage.root.clone().unwrap_or_else(|| self.storage_root.clone());
        let shard_count = file.storage.shard_count.unwrap_or(self.shard_count);
        let shard_size_mb = file.storage.shard_size_mb.unwrap_or(self.shard_size_mb);
        let iterations = bench.iterations.unwrap_or(self.iterations);
        let concurrency = bench.concurrency.unwrap_or(self.concurrency);
        let mode = bench.mode.as_deref().unwrap_or(&self.mode);
        let retention = bench.retention.unwrap_or(self.retention);
        let fsync = bench
            .fsync
            .as_ref()
            .map(|f| f.as_bool())
            .unwrap_or_else(|| parse_flag(&self.fsync));
        let chunk_mb = bench.chunk_mb.unwrap_or(self.chunk_mb);
        let read_buffer_kb = bench.read_buffer_kb.unwrap_or(self.read_buffer_kb);
        let cleanup_after = bench
            .cleanup_after
            .as_ref()
            .map(|f| f.as_bool())
            .unwrap_or_else(|| parse_flag(&self.cleanup_after));
        let outdir = file.output.dir.clone().unwrap_or_else(|| self.outdir.clone());

        let params = BenchmarkParams {
            run_name,
            root,
            iterations: at_least(iterations, 1),
            shard_count: at_least(shard_count, 1),
            shard_size_mb,
            concurrency: at_least(concurrency, 1),
            fsync,
            mode: mode.parse::<Mode>()?,
            retention: at_least(retention, 0),
            chunk_mb: chunk_mb.max(0.1),
            read_buffer_kb: at_least(read_buffer_kb, 1) as u64,
            cleanup_after,
        };

        Ok(ResolvedArgs { params, outdir })
    }
}

fn at_least(value: i64, floor: i64) -> usize {
    value.max(floor) as usize
}
