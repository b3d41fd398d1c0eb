//! Repositories for file records and background jobs.

pub mod file;
pub mod job;
#[cfg(feature = "memory")]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use cabinet_core::result::AppResult;
use cabinet_entity::file::{FileRecord, NewFileRecord};

pub use file::FileRepository;
pub use job::JobRepository;
#[cfg(feature = "memory")]
pub use memory::MemoryFileRepository;

/// Persistence of file records.
///
/// Ownership is part of every lookup that serves a user so that records
/// belonging to someone else are indistinguishable from missing ones.
#[async_trait]
pub trait FileRecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a record by ID regardless of owner.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>>;

    /// Find a record by ID owned by `user_id`.
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<FileRecord>>;

    /// List a user's records under `parent_id` (None = root) in insertion order.
    async fn find_children(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<FileRecord>>;

    /// Insert a record and return it with its assigned ID.
    async fn create(&self, data: &NewFileRecord) -> AppResult<FileRecord>;

    /// Set `is_public` on a record owned by `user_id`, returning the updated row.
    async fn set_visibility(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_public: bool,
    ) -> AppResult<Option<FileRecord>>;

    /// Total number of records.
    async fn count(&self) -> AppResult<u64>;

    /// Number of distinct record owners.
    async fn count_owners(&self) -> AppResult<u64>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
