//! Local filesystem content store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use cabinet_core::error::{AppError, ErrorKind};
use cabinet_core::result::AppResult;
use cabinet_core::traits::storage::ContentStore;

/// Local filesystem content store.
///
/// Originals are written flat under `root` with a random UUID name.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Absolute root directory for stored originals.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    ///
    /// The directory is created if it does not exist yet and the root is
    /// made absolute so that stored paths stay valid from any working
    /// directory.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        ensure_dir(&root).await?;
        let root = fs::canonicalize(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to resolve storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The absolute root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path: absolute paths are used as-is, relative ones are
    /// taken from the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

/// Create a directory and its parents if absent.
async fn ensure_dir(path: &Path) -> AppResult<()> {
    fs::create_dir_all(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to create directory: {}", path.display()),
            e,
        )
    })
}

#[async_trait]
impl ContentStore for LocalStorageProvider {
    async fn put(&self, data: Bytes) -> AppResult<String> {
        // The root may have been removed since startup.
        ensure_dir(&self.root).await?;

        let full_path = self.root.join(Uuid::new_v4().to_string());
        let path = full_path
            .to_str()
            .ok_or_else(|| AppError::storage("Storage root is not valid UTF-8"))?
            .to_string();

        self.write(&path, data).await?;
        Ok(path)
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path);
        if let Some(parent) = full_path.parent() {
            ensure_dir(parent).await?;
        }

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Wrote file");
        Ok(())
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Removed file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove file: {path}"),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let data = Bytes::from("hello world");
        let path = provider.put(data.clone()).await.unwrap();

        assert!(Path::new(&path).is_absolute());
        assert!(Path::new(&path).is_file());
        assert_eq!(provider.read_bytes(&path).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_put_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let a = provider.put(Bytes::from("same")).await.unwrap();
        let b = provider.put(Bytes::from("same")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_root_is_created_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/files");
        let provider = LocalStorageProvider::new(nested.to_str().unwrap())
            .await
            .unwrap();
        assert!(nested.is_dir());

        fs::remove_dir_all(&nested).await.unwrap();

        let path = provider.put(Bytes::from("x")).await.unwrap();
        assert!(Path::new(&path).is_file());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let err = provider.read_bytes("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let path = provider.put(Bytes::from("gone soon")).await.unwrap();
        provider.remove(&path).await.unwrap();
        assert!(!Path::new(&path).exists());
        assert!(provider.read_bytes(&path).await.unwrap_err().is_not_found());

        provider.remove(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let path = provider.put(Bytes::from("v1")).await.unwrap();
        let derivative = format!("{path}_100");
        provider.write(&derivative, Bytes::from("a")).await.unwrap();
        provider.write(&derivative, Bytes::from("b")).await.unwrap();
        assert_eq!(
            provider.read_bytes(&derivative).await.unwrap(),
            Bytes::from("b")
        );
    }
}
