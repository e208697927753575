//! Run metadata written next to the reports

use bench_core::BenchmarkParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summary::BenchmarkSummary;

/// Contents of `metadata.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_name: String,

    /// ISO-8601 UTC, second precision
    pub timestamp_utc: String,

    pub host: HostInfo,

    pub parameters: BenchmarkParams,

    pub summary: BenchmarkSummary,
}

/// Machine the run executed on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,

    /// `{os}-{arch}`
    pub platform: String,

    /// Version of this tool
    pub tool_version: String,
}

impl HostInfo {
    pub fn current() -> Self {
        Self {
            hostname: hostname(),
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl RunMetadata {
    pub fn new(params: &BenchmarkParams, summary: &BenchmarkSummary) -> Self {
        Self::at(Utc::now(), params, summary)
    }

    pub fn at(now: DateTime<Utc>, params: &BenchmarkParams, summary: &BenchmarkSummary) -> Self {
        Self {
            run_name: params.run_name.clone(),
            timestamp_utc: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            host: HostInfo::current(),
            parameters: params.clone(),
            summary: summary.clone(),
        }
    }
}

/// Get the hostname, with fallback.
fn hostname() -> String {
    #[cfg(unix)]
    {
        std::process::Command::new("hostname")
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }

    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::Mode;
    use chrono::TimeZone;
    use std::path::PathBuf;

    #[test]
    fn test_metadata_layout() {
        let params = BenchmarkParams {
            run_name: "meta".to_string(),
            root: PathBuf::from("/data/ckpt"),
            iterations: 1,
            shard_count: 1,
            shard_size_mb: 1.0,
            concurrency: 1,
            fsync: false,
            mode: Mode::Write,
            retention: 0,
            chunk_mb: 4.0,
            read_buffer_kb: 1024,
            cleanup_after: true,
        };
        let summary = BenchmarkSummary::build(&params, &[], &[]);
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();

        let meta = RunMetadata::at(now, &params, &summary);
        assert_eq!(meta.timestamp_utc, "2026-03-04T05:06:07Z");
        assert!(!meta.host.hostname.is_empty());

        let yaml = serde_yaml::to_string(&meta).unwrap();
        assert!(yaml.contains("run_name: meta"));
        assert!(yaml.contains("storage_root: /data/ckpt"));
        assert!(yaml.contains("mode: write"));
        assert!(yaml.contains("cleanup_after: true"));
    }
}
