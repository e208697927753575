//! Core type definitions for the checkpoint benchmark

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Bytes per mebibyte
pub const MIB: u64 = 1024 * 1024;

/// Bytes per kibibyte
pub const KIB: u64 = 1024;

/// Shard iteration counter (1-based)
pub type Iteration = usize;

/// Shard identifier (0-based submission index)
pub type ShardId = usize;

/// Which phases a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    /// Write checkpoints only
    Write,

    /// Read pre-existing checkpoints only
    Read,

    /// Write each checkpoint, then read it back
    WriteRead,
}

impl Mode {
    /// Whether this mode runs a write phase every iteration
    pub fn writes(self) -> bool {
        matches!(self, Mode::Write | Mode::WriteRead)
    }

    /// Whether this mode runs a read phase every iteration
    pub fn reads(self) -> bool {
        matches!(self, Mode::Read | Mode::WriteRead)
    }

    /// Wire name used in configs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Write => "write",
            Mode::Read => "read",
            Mode::WriteRead => "write-read",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "write" => Ok(Mode::Write),
            "read" => Ok(Mode::Read),
            "write-read" => Ok(Mode::WriteRead),
            other => Err(Error::invalid_config(format!(
                "Unsupported mode '{}'. Expected one of: write, read, write-read.",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benchmark phase a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Write,
    Read,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Write => "write",
            Phase::Read => "read",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing of a single shard write or read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardRecord {
    /// Iteration the shard belongs to (1-based)
    pub iteration: Iteration,

    /// Write or read
    pub phase: Phase,

    /// Submission index within the phase
    pub shard_id: ShardId,

    /// Bytes written, or the on-disk size for reads
    pub bytes: u64,

    /// Shard duration in seconds, always > 0
    pub duration_sec: f64,

    /// MiB/s
    pub throughput_mb_s: f64,

    /// Shard file path
    pub path: String,
}

/// Aggregate timing of one whole phase of one iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Iteration (1-based)
    pub iteration: Iteration,

    /// Write or read
    pub phase: Phase,

    /// Wall-clock span of the phase's worker pool in seconds
    pub duration_sec: f64,

    /// Sum of shard bytes
    pub total_bytes: u64,

    /// MiB/s over the wall-clock span
    pub throughput_mb_s: f64,
}
