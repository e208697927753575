//! Benchmark configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Mode, Result, KIB, MIB};

/// Immutable parameters of one benchmark run
///
/// Constructed once by the configuration loader and passed by reference to
/// every component. The core applies no defaults of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkParams {
    /// Prefix of every checkpoint directory this run creates
    pub run_name: String,

    /// Directory holding the checkpoint directories
    #[serde(rename = "storage_root", alias = "root")]
    pub root: PathBuf,

    /// Number of iterations (>= 1)
    pub iterations: usize,

    /// Shard files per checkpoint (>= 1)
    pub shard_count: usize,

    /// Payload size of each shard in MiB
    pub shard_size_mb: f64,

    /// Worker pool size per phase (>= 1)
    pub concurrency: usize,

    /// Force written data to stable storage before closing each shard
    pub fsync: bool,

    /// Which phases to run
    pub mode: Mode,

    /// Maximum number of run-created directories kept on disk (0 = unbounded)
    pub retention: usize,

    /// Write block size in MiB
    pub chunk_mb: f64,

    /// Read block size in KiB (>= 1)
    pub read_buffer_kb: u64,

    /// Delete every run-created directory once the run finishes
    pub cleanup_after: bool,
}

impl BenchmarkParams {
    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        if self.run_name.is_empty() {
            return Err(Error::invalid_config("run_name must not be empty"));
        }
        if self.run_name.contains(['/', '\\']) {
            return Err(Error::invalid_config(format!(
                "run_name '{}' must not contain path separators",
                self.run_name
            )));
        }
        if self.iterations == 0 {
            return Err(Error::invalid_config("iterations must be at least 1"));
        }
        if self.shard_count == 0 {
            return Err(Error::invalid_config("shard_count must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(Error::invalid_config("concurrency must be at least 1"));
        }
        if !self.shard_size_mb.is_finite() || self.shard_size_mb < 0.0 {
            return Err(Error::invalid_config(format!(
                "shard_size_mb must be a non-negative number, got {}",
                self.shard_size_mb
            )));
        }
        if !self.chunk_mb.is_finite() || self.chunk_mb <= 0.0 {
            return Err(Error::invalid_config(format!(
                "chunk_mb must be a positive number, got {}",
                self.chunk_mb
            )));
        }
        if self.read_buffer_kb == 0 {
            return Err(Error::invalid_config("read_buffer_kb must be at least 1"));
        }
        Ok(())
    }

    /// Bytes written per shard: round(shard_size_mb * 1 MiB)
    pub fn shard_bytes(&self) -> u64 {
        (self.shard_size_mb * MIB as f64).round() as u64
    }

    /// Write block size: max(1, round(chunk_mb * 1 MiB))
    pub fn chunk_bytes(&self) -> u64 {
        ((self.chunk_mb * MIB as f64).round() as u64).max(1)
    }

    /// Read block size: max(1, read_buffer_kb * 1 KiB)
    pub fn read_buffer_bytes(&self) -> u64 {
        self.read_buffer_kb.saturating_mul(KIB).max(1)
    }
}

/// On-disk YAML configuration file
///
/// Every key is optional; present keys override command-line values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub run: RunSection,
    pub storage: StorageSection,
    pub benchmark: BenchmarkSection,
    pub output: OutputSection,
}

/// `run:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    pub name: Option<String>,
}

/// `storage:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub root: Option<PathBuf>,
    pub shard_count: Option<i64>,
    pub shard_size_mb: Option<f64>,
}

/// `benchmark:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSection {
    pub iterations: Option<i64>,
    pub concurrency: Option<i64>,
    pub mode: Option<String>,
    pub retention: Option<i64>,
    pub fsync: Option<Flag>,
    pub chunk_mb: Option<f64>,
    pub read_buffer_kb: Option<i64>,
    pub cleanup_after: Option<Flag>,
}

/// `output:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
}

/// Boolean that tolerates YAML booleans, numbers and strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Flag {
    pub fn as_bool(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Number(n) => *n != 0.0,
            Flag::Text(s) => parse_flag(s),
        }
    }
}

/// Truthy strings: 1, true, yes, y, on (case-insensitive)
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl ConfigFile {
    /// Parse a YAML document; an empty document yields all-`None` sections
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str::<Option<Self>>(text)?.unwrap_or_default())
    }

    /// Load and parse a YAML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Storage {
            message: format!("Failed to read config {}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&text)
    }
}
