//! Content store trait for raw file bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for the byte store backing non-folder records.
///
/// Paths handed out by [`ContentStore::put`] are absolute and are stored
/// verbatim on the record; derivatives are written next to them by the
/// thumbnail worker through [`ContentStore::write`].
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Store bytes under a freshly generated name and return the absolute path.
    ///
    /// The name never derives from user input.
    async fn put(&self, data: Bytes) -> AppResult<String>;

    /// Write bytes to an absolute path, replacing any existing file.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Read a whole file into memory.
    ///
    /// Returns a `NotFound` error when nothing exists at `path`.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Delete the file at `path`. A missing file is not an error.
    async fn remove(&self, path: &str) -> AppResult<()>;
}
