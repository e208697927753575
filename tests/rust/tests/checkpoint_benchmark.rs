use anyhow::Result;
use bench_core::{BenchmarkParams, Error, Mode, Phase};
use checkpoint::{BenchmarkRecords, CheckpointBenchmark};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MIB: u64 = 1_048_576;

fn params(root: &Path) -> BenchmarkParams {
    BenchmarkParams {
        run_name: "t1".to_string(),
        root: root.to_path_buf(),
        iterations: 2,
        shard_count: 4,
        shard_size_mb: 1.0,
        concurrency: 2,
        fsync: false,
        mode: Mode::WriteRead,
        retention: 1,
        chunk_mb: 0.25,
        read_buffer_kb: 64,
        cleanup_after: false,
    }
}

async fn run(params: BenchmarkParams) -> Result<(CheckpointBenchmark, BenchmarkRecords)> {
    let mut bench = CheckpointBenchmark::with_local_storage(params)?;
    let records = bench.run().await?;
    Ok((bench, records))
}

fn dir_names(root: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(root)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn file_sizes(dir: &Path) -> Vec<(String, u64)> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| (e.file_name().to_string_lossy().to_string(), e.metadata().unwrap().len()))
        .collect();
    files.sort();
    files
}

#[tokio::test]
async fn test_retention_scenario() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (bench, records) = run(params(temp_dir.path())).await?;

    // Only the newest checkpoint survives
    assert_eq!(dir_names(temp_dir.path()), vec!["t1_ckpt_0002"]);
    assert_eq!(bench.created_dirs(), vec![temp_dir.path().join("t1_ckpt_0002")]);

    let second_read: Vec<_> = records
        .shards
        .iter()
        .filter(|s| s.iteration == 2 && s.phase == Phase::Read)
        .collect();
    assert_eq!(second_read.len(), 4);
    assert!(second_read.iter().all(|s| s.bytes == MIB));
    assert!(second_read
        .iter()
        .all(|s| s.path.contains("t1_ckpt_0002")));

    // First iteration was read back in full before it was trimmed
    let first_read_bytes: u64 = records
        .iterations
        .iter()
        .filter(|r| r.iteration == 1 && r.phase == Phase::Read)
        .map(|r| r.total_bytes)
        .sum();
    assert_eq!(first_read_bytes, 4 * MIB);
    Ok(())
}

#[tokio::test]
async fn test_write_mode_unbounded_retention() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut p = params(temp_dir.path());
    p.mode = Mode::Write;
    p.retention = 0;
    p.iterations = 3;
    p.shard_count = 3;
    p.shard_size_mb = 0.3;

    let (_, records) = run(p.clone()).await?;

    assert_eq!(
        dir_names(temp_dir.path()),
        vec!["t1_ckpt_0001", "t1_ckpt_0002", "t1_ckpt_0003"]
    );
    let expected = (0.3 * MIB as f64).round() as u64;
    for name in dir_names(temp_dir.path()) {
        assert_eq!(
            file_sizes(&temp_dir.path().join(name)),
            vec![
                ("shard_00000.ckpt".to_string(), expected),
                ("shard_00001.ckpt".to_string(), expected),
                ("shard_00002.ckpt".to_string(), expected),
            ]
        );
    }

    assert!(records.iterations.iter().all(|r| r.phase == Phase::Write));
    assert!(records
        .shards
        .iter()
        .all(|s| s.duration_sec > 0.0 && s.throughput_mb_s.is_finite() && s.throughput_mb_s > 0.0));
    Ok(())
}

#[tokio::test]
async fn test_retention_never_exceeds_bound() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut p = params(temp_dir.path());
    p.mode = Mode::Write;
    p.retention = 2;
    p.iterations = 5;
    p.shard_count = 1;
    p.shard_size_mb = 0.01;

    // Step the run one iteration at a time by growing the iteration count
    for iterations in 1..=p.iterations {
        let step_dir = temp_dir.path().join(format!("step{}", iterations));
        let mut step = p.clone();
        step.root = step_dir.clone();
        step.iterations = iterations;
        run(step).await?;

        let names = dir_names(&step_dir);
        assert!(names.len() <= 2);
        let newest: Vec<_> = (iterations.saturating_sub(1).max(1)..=iterations)
            .map(|i| format!("t1_ckpt_{:04}", i))
            .collect();
        assert_eq!(names, newest);
    }
    Ok(())
}

#[tokio::test]
async fn test_read_only_requires_enough_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("ckpt");
    std::fs::create_dir_all(root.join("t1_ckpt_0001"))?;

    let mut p = params(&root);
    p.mode = Mode::Read;
    p.iterations = 2;

    let Err(err) = run(p).await else {
        panic!("read-only run with one directory must fail");
    };
    let err = err.downcast::<Error>()?;
    assert!(matches!(
        err,
        Error::InsufficientCheckpoints {
            required: 2,
            found: 1,
            ..
        }
    ));

    // Nothing was written anywhere
    assert_eq!(dir_names(&root), vec!["t1_ckpt_0001"]);
    assert!(std::fs::read_dir(root.join("t1_ckpt_0001"))?.next().is_none());
    Ok(())
}

#[tokio::test]
async fn test_read_only_reads_earliest_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut seed = params(temp_dir.path());
    seed.mode = Mode::Write;
    seed.retention = 0;
    seed.iterations = 3;
    seed.shard_size_mb = 0.05;
    run(seed).await?;

    // A foreign checkpoint with different naming and sizes
    let foreign = temp_dir.path().join("t1_ckpt_0000");
    std::fs::create_dir(&foreign)?;
    std::fs::write(foreign.join("rank0.ckpt"), vec![0u8; 1000])?;
    std::fs::write(foreign.join("rank1.ckpt"), vec![0u8; 3000])?;

    let mut p = params(temp_dir.path());
    p.mode = Mode::Read;
    p.iterations = 2;
    let (bench, records) = run(p).await?;

    assert!(bench.created_dirs().is_empty());
    assert_eq!(records.iterations.len(), 2);

    // Iteration 1 is the lexically first directory, with actual sizes
    let first: Vec<_> = records.shards.iter().filter(|s| s.iteration == 1).collect();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].bytes, 1000);
    assert_eq!(first[1].bytes, 3000);
    assert_eq!(records.iterations[0].total_bytes, 4000);

    let second: Vec<_> = records.shards.iter().filter(|s| s.iteration == 2).collect();
    assert_eq!(second.len(), 4);
    assert!(second.iter().all(|s| s.path.contains("t1_ckpt_0001")));

    // Nothing was removed
    assert_eq!(dir_names(temp_dir.path()).len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_round_trip_byte_counts_match() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut p = params(temp_dir.path());
    p.iterations = 1;
    p.shard_count = 5;
    p.shard_size_mb = 0.123;
    p.chunk_mb = 0.1;

    let (_, records) = run(p).await?;

    let writes: Vec<_> = records.shards.iter().filter(|s| s.phase == Phase::Write).collect();
    let reads: Vec<_> = records.shards.iter().filter(|s| s.phase == Phase::Read).collect();
    assert_eq!(writes.len(), 5);
    assert_eq!(reads.len(), 5);
    for (w, r) in writes.iter().zip(&reads) {
        assert_eq!(w.shard_id, r.shard_id);
        assert_eq!(w.bytes, r.bytes);
        assert_eq!(w.path, r.path);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_invariance() -> Result<()> {
    let mut outcomes = Vec::new();

    for concurrency in [1, 4] {
        let temp_dir = TempDir::new()?;
        let mut p = params(temp_dir.path());
        p.iterations = 2;
        p.retention = 0;
        p.shard_count = 6;
        p.shard_size_mb = 0.2;
        p.concurrency = concurrency;

        let (_, records) = run(p).await?;

        let totals: Vec<_> = records
            .iterations
            .iter()
            .map(|r| (r.iteration, r.phase, r.total_bytes))
            .collect();
        let files: BTreeSet<_> = dir_names(temp_dir.path())
            .into_iter()
            .flat_map(|d| {
                file_sizes(&temp_dir.path().join(&d))
                    .into_iter()
                    .map(move |(f, size)| (d.clone(), f, size))
            })
            .collect();
        outcomes.push((totals, files));
    }

    assert_eq!(outcomes[0], outcomes[1]);
    Ok(())
}

#[tokio::test]
async fn test_cleanup_after_removes_created_dirs() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::create_dir(temp_dir.path().join("unrelated"))?;

    let mut p = params(temp_dir.path());
    p.retention = 0;
    p.cleanup_after = true;
    p.fsync = true;
    p.shard_size_mb = 0.05;

    let (_, records) = run(p).await?;

    assert_eq!(records.iterations.len(), 4);
    assert_eq!(dir_names(temp_dir.path()), vec!["unrelated"]);
    Ok(())
}

#[tokio::test]
async fn test_io_failure_aborts_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file")?;

    let mut p = params(&blocker);
    p.mode = Mode::Write;

    let Err(err) = run(p).await else {
        panic!("writing under a regular file must fail");
    };
    let err = err.downcast::<Error>()?;
    assert!(matches!(err, Error::Storage { .. }));
    Ok(())
}

#[tokio::test]
async fn test_invalid_params_rejected_before_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut p = params(&temp_dir.path().join("never"));
    p.concurrency = 0;

    let err = CheckpointBenchmark::with_local_storage(p).err().expect("must fail");
    assert!(err.is_fatal());
    assert!(!temp_dir.path().join("never").exists());
    Ok(())
}

#[tokio::test]
async fn test_reports_from_real_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut p = params(&temp_dir.path().join("ckpt"));
    p.shard_size_mb = 0.05;
    let (_, records) = run(p.clone()).await?;

    let report_dir: PathBuf = temp_dir.path().join("metrics").join(&p.run_name);
    let summary = ckpt_bench::output::write_reports(&report_dir, &p, &records)?;

    assert_eq!(summary.write_iterations, 2);
    assert_eq!(summary.read_iterations, 2);
    assert_eq!(summary.total_bytes_written, 2 * 4 * p.shard_bytes());
    assert_eq!(summary.total_bytes_read, summary.total_bytes_written);

    let shards_csv = std::fs::read_to_string(report_dir.join("checkpoint_shards.csv"))?;
    assert_eq!(shards_csv.lines().count(), 1 + records.shards.len());
    assert!(shards_csv
        .starts_with("iteration,phase,shard_id,bytes,duration_sec,throughput_mb_s,path\n"));

    let metadata: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(report_dir.join("metadata.yaml"))?)?;
    assert_eq!(metadata["run_name"].as_str(), Some("t1"));
    assert_eq!(metadata["parameters"]["mode"].as_str(), Some("write-read"));
    Ok(())
}
