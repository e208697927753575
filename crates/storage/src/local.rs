//! Local filesystem storage backend

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bench_core::{Error, Result};
use tokio::fs;
use tracing::{debug, instrument};

use crate::StorageBackend;

/// Local filesystem storage backend
///
/// Operates on a single root directory with support for:
/// - Automatic parent directory creation
/// - Name-sorted directory and file discovery
/// - Recursive removal
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Base path for all storage operations
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory to use as the storage root
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Resolve a relative name to a full path
    fn resolve_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Collect directory entries accepted by `keep`, sorted by file name
    async fn scan<F>(dir: &Path, mut keep: F) -> Result<Vec<PathBuf>>
    where
        F: FnMut(&Path, &std::fs::FileType) -> bool,
    {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Storage {
                    message: format!("Failed to list {}: {}", dir.display(), e),
                })
            }
        };

        let mut results = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::Storage {
            message: format!("Failed to list {}: {}", dir.display(), e),
        })? {
            let path = entry.path();
            // Follow symlinks so linked checkpoint dirs are discovered too
            let file_type = match fs::metadata(&path).await {
                Ok(meta) => meta.file_type(),
                Err(_) => continue,
            };
            if keep(&path, &file_type) {
                results.push(path);
            }
        }

        results.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(results)
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    fn root(&self) -> &Path {
        &self.base_path
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let full_path = self.resolve_path(name);
        debug!(?full_path, "Creating directory");

        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| Error::Storage {
                message: format!("Failed to create directory {}: {}", full_path.display(), e),
            })?;

        Ok(full_path)
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn list_dirs(&self) -> Result<Vec<PathBuf>> {
        let dirs = Self::scan(&self.base_path, |_, file_type| file_type.is_dir()).await?;
        debug!(count = dirs.len(), root = %self.base_path.display(), "Found directories");
        Ok(dirs)
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let files = Self::scan(dir, |path, file_type| {
            file_type.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy() == extension)
        })
        .await?;
        debug!(count = files.len(), "Found files");
        Ok(files)
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn remove_dir(&self, dir: &Path) -> Result<()> {
        debug!(?dir, "Removing directory");

        match fs::remove_dir_all(dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::Storage {
                message: format!("Directory not found: {}", dir.display()),
            }),
            Err(e) => Err(Error::Storage {
                message: format!("Failed to remove {}: {}", dir.display(), e),
            }),
        }
    }

    async fn file_size(&self, path: &Path) -> Result<u64> {
        let meta = fs::metadata(path).await.map_err(|e| Error::Storage {
            message: format!("Failed to stat {}: {}", path.display(), e),
        })?;
        Ok(meta.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, LocalStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn test_create_dir_with_parents() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("a").join("b"));

        let dir = storage.create_dir("run_ckpt_0001").await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, temp_dir.path().join("a/b/run_ckpt_0001"));

        // Existing directories are fine
        storage.create_dir("run_ckpt_0001").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_dirs_sorted_and_filtered() {
        let (temp_dir, storage) = setup().await;

        storage.create_dir("r_ckpt_0003").await.unwrap();
        storage.create_dir("r_ckpt_0001").await.unwrap();
        storage.create_dir("r_ckpt_0002").await.unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();

        let dirs = storage.list_dirs().await.unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["r_ckpt_0001", "r_ckpt_0002", "r_ckpt_0003"]);
    }

    #[tokio::test]
    async fn test_list_dirs_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("missing"));

        assert!(storage.list_dirs().await.unwrap().is_empty());
        assert!(!temp_dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn test_list_files_by_extension() {
        let (_temp_dir, storage) = setup().await;
        let dir = storage.create_dir("c").await.unwrap();

        std::fs::write(dir.join("shard_00001.ckpt"), b"1").unwrap();
        std::fs::write(dir.join("shard_00000.ckpt"), b"0").unwrap();
        std::fs::write(dir.join("manifest.json"), b"{}").unwrap();
        std::fs::create_dir(dir.join("nested.ckpt")).unwrap();

        let files = storage.list_files(&dir, "ckpt").await.unwrap();
        assert_eq!(
            files,
            vec![dir.join("shard_00000.ckpt"), dir.join("shard_00001.ckpt")]
        );

        let missing = storage.list_files(&dir.join("nope"), "ckpt").await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_remove_dir() {
        let (_temp_dir, storage) = setup().await;
        let dir = storage.create_dir("doomed").await.unwrap();
        std::fs::write(dir.join("shard_00000.ckpt"), b"data").unwrap();

        storage.remove_dir(&dir).await.unwrap();
        assert!(!dir.exists());

        let result = storage.remove_dir(&dir).await;
        assert!(matches!(result, Err(Error::Storage { .. })));
    }

    #[tokio::test]
    async fn test_file_size() {
        let (temp_dir, storage) = setup().await;
        let path = temp_dir.path().join("f.ckpt");
        std::fs::write(&path, vec![7u8; 1234]).unwrap();

        assert_eq!(storage.file_size(&path).await.unwrap(), 1234);
        assert!(storage.file_size(&temp_dir.path().join("nope")).await.is_err());
    }
}
