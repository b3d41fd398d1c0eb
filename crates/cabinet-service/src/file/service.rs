//! Owner-scoped reads and visibility changes on file records.

use std::sync::Arc;

use tracing::info;

use cabinet_core::error::AppError;
use cabinet_core::result::AppResult;
use cabinet_core::types::PageRequest;
use cabinet_database::repositories::FileRecordStore;
use cabinet_entity::file::{FileRecord, ParentRef};

use super::{NOT_FOUND, parse_record_id};
use crate::context::RequestContext;

/// Reads and updates records owned by the caller.
#[derive(Clone)]
pub struct FileService {
    /// Record store.
    store: Arc<dyn FileRecordStore>,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(store: Arc<dyn FileRecordStore>) -> Self {
        Self { store }
    }

    /// Fetch one of the caller's records.
    pub async fn get(&self, ctx: &RequestContext, id: &str) -> AppResult<FileRecord> {
        let id = parse_record_id(id)?;
        self.store
            .find_owned(id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    /// List one page of the caller's records under a parent.
    ///
    /// An unparseable parent names nothing and yields an empty page.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        parent_id: Option<&str>,
        page: PageRequest,
    ) -> AppResult<Vec<FileRecord>> {
        let parent = match parent_id {
            None => ParentRef::Root,
            Some(raw) => match ParentRef::parse(raw) {
                Some(parent) => parent,
                None => return Ok(Vec::new()),
            },
        };

        self.store
            .find_children(ctx.user_id, parent.as_column(), page.offset(), page.limit())
            .await
    }

    /// Set the public flag on one of the caller's records.
    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        id: &str,
        is_public: bool,
    ) -> AppResult<FileRecord> {
        let id = parse_record_id(id)?;
        let record = self
            .store
            .set_visibility(id, ctx.user_id, is_public)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

        info!(user_id = %ctx.user_id, file_id = %record.id, is_public, "Visibility updated");
        Ok(record)
    }
}
