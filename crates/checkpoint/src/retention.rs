//! Retention of benchmark-created checkpoint directories

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use storage::StorageBackend;
use tracing::{debug, warn};

/// Keeps at most `keep` run-created directories on disk (0 = unbounded)
///
/// Only directories the run created itself are ever passed in; discovered
/// read-only targets are never trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    keep: usize,
}

impl RetentionPolicy {
    pub fn new(keep: usize) -> Self {
        Self { keep }
    }

    pub fn is_unbounded(&self) -> bool {
        self.keep == 0
    }

    /// Drop the oldest entries until at most `keep` remain
    ///
    /// Removed entries are deleted from storage on a best-effort basis: a
    /// failed deletion is logged and otherwise ignored. Returns the trimmed
    /// paths, oldest first.
    pub async fn trim(
        &self,
        created: &mut VecDeque<PathBuf>,
        storage: &dyn StorageBackend,
    ) -> Vec<PathBuf> {
        let mut trimmed = Vec::new();
        if self.is_unbounded() {
            return trimmed;
        }

        while created.len() > self.keep {
            let Some(doomed) = created.pop_front() else {
                break;
            };
            remove_best_effort(storage, &doomed).await;
            trimmed.push(doomed);
        }
        trimmed
    }
}

/// Remove `dir`, logging instead of failing
pub async fn remove_best_effort(storage: &dyn StorageBackend, dir: &Path) {
    match storage.remove_dir(dir).await {
        Ok(()) => debug!(dir = %dir.display(), "Removed checkpoint directory"),
        Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to remove checkpoint directory"),
    }
}
