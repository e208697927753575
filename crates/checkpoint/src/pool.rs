//! Bounded worker pool scoped to one benchmark phase

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bench_core::{Error, Result};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::throughput::{clamped_secs, MIN_PHASE_DURATION_SECS};

/// Results of a drained pool, in submission order
#[derive(Debug)]
pub struct PoolOutput<T> {
    /// One result per submitted task, indexed by submission position
    pub results: Vec<T>,

    /// Wall-clock span from pool creation to the last task's completion
    pub elapsed_sec: f64,
}

/// Fixed-size task pool: at most `concurrency` tasks touch storage at once
#[derive(Debug, Clone, Copy)]
pub struct ShardPool {
    concurrency: usize,
}

impl ShardPool {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Run every task, wait for all of them, and return their results
    ///
    /// Excess tasks queue on the semaphore. Results are stored at each
    /// task's submission index regardless of completion order. If any task
    /// fails, the remaining tasks are still drained before the first error
    /// (in submission order) is returned.
    pub async fn run<T, F>(&self, tasks: Vec<F>) -> Result<PoolOutput<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let start = Instant::now();
        let permits = Arc::new(Semaphore::new(self.concurrency));

        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let permits = Arc::clone(&permits);
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::Internal {
                            message: format!("shard pool closed: {}", e),
                        })?;
                    task.await
                })
            })
            .collect();

        let submitted = handles.len();
        let mut results = Vec::with_capacity(submitted);
        let mut first_error = None;

        for (index, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::Internal {
                    message: format!("shard task {} did not complete: {}", index, e),
                }),
            };
            match outcome {
                Ok(value) if first_error.is_none() => results.push(value),
                Ok(_) => {}
                Err(e) => {
                    debug!(index, error = %e, "Shard task failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let elapsed_sec = clamped_secs(start.elapsed(), MIN_PHASE_DURATION_SECS);
        debug!(
            tasks = submitted,
            concurrency = self.concurrency,
            elapsed_sec,
            "Shard pool drained"
        );

        Ok(PoolOutput {
            results,
            elapsed_sec,
        })
    }
}
