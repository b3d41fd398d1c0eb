//! In-memory file record store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use cabinet_core::result::AppResult;
use cabinet_entity::file::{FileRecord, NewFileRecord};

use super::FileRecordStore;

/// File record store backed by a vector. Records keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryFileRepository {
    records: RwLock<Vec<FileRecord>>,
}

impl MemoryFileRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRecordStore for MemoryFileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<FileRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn find_children(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<FileRecord>> {
        let records = self.records.read().await;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id && r.parent_id == parent_id)
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn create(&self, data: &NewFileRecord) -> AppResult<FileRecord> {
        let record = FileRecord {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name.clone(),
            kind: data.kind,
            is_public: data.is_public,
            parent_id: data.parent_id,
            local_path: data.local_path.clone(),
            created_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn set_visibility(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_public: bool,
    ) -> AppResult<Option<FileRecord>> {
        let mut records = self.records.write().await;
        Ok(records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
            .map(|r| {
                r.is_public = is_public;
                r.clone()
            }))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn count_owners(&self) -> AppResult<u64> {
        let records = self.records.read().await;
        let mut owners: Vec<Uuid> = records.iter().map(|r| r.user_id).collect();
        owners.sort_unstable();
        owners.dedup();
        Ok(owners.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
