//! Bench Core - Foundation for the checkpoint I/O benchmark
//!
//! Provides the run parameters, record types and error handling shared by
//! the storage layer, the checkpoint orchestrator and the CLI.

pub mod config;
pub mod error;
pub mod types;

pub use config::{BenchmarkParams, ConfigFile};
pub use error::{Error, Result};
pub use types::*;
