//! Command-line surface of the checkpoint I/O benchmark
//!
//! Turns flags and an optional YAML file into [`bench_core::BenchmarkParams`],
//! and renders the records of a run as CSV tables, a summary and run
//! metadata.

pub mod args;
pub mod metadata;
pub mod output;
pub mod report;
pub mod summary;

pub use args::{Args, ResolvedArgs};
pub use metadata::RunMetadata;
pub use summary::BenchmarkSummary;
