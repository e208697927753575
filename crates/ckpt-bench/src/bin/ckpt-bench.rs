//! Checkpoint benchmark binary entry point
//!
//! Writes and/or reads synthetic sharded checkpoints and reports throughput.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkpoint::CheckpointBenchmark;
use ckpt_bench::output::write_reports;
use ckpt_bench::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "ckpt_bench={lvl},checkpoint={lvl},storage={lvl}",
                    lvl = default_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let resolved = args.resolve().context("invalid configuration")?;
    let params = resolved.params.clone();

    let mut benchmark =
        CheckpointBenchmark::with_local_storage(params.clone()).context("invalid configuration")?;
    let records = benchmark.run().await.context("checkpoint benchmark failed")?;

    let report_dir = resolved.report_dir();
    let summary = write_reports(&report_dir, &params, &records)
        .with_context(|| format!("failed to write reports to {}", report_dir.display()))?;

    tracing::info!(
        report_dir = %report_dir.display(),
        write_avg_throughput_mb_s = summary.write_avg_throughput_mb_s,
        read_avg_throughput_mb_s = summary.read_avg_throughput_mb_s,
        "Run finished"
    );

    Ok(())
}
