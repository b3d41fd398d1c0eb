//! File creation: folders, and files or images uploaded as base64.

use std::sync::Arc;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use bytes::Bytes;
use tracing::{info, warn};

use cabinet_core::error::AppError;
use cabinet_core::result::AppResult;
use cabinet_core::traits::{ContentStore, JobPublisher};
use cabinet_database::repositories::FileRecordStore;
use cabinet_entity::file::{FileKind, FileRecord, NewFileRecord, ParentRef};
use cabinet_entity::job::{THUMBNAIL_JOB, ThumbnailPayload};

use crate::context::RequestContext;

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Fields of a create request, as loosely as clients send them.
#[derive(Debug, Clone, Default)]
pub struct CreateFileParams {
    /// Display name.
    pub name: Option<String>,
    /// Kind as a string (`folder`, `file` or `image`).
    pub kind: Option<String>,
    /// Raw parent reference; `None` means the root.
    pub parent_id: Option<String>,
    /// Initial visibility.
    pub is_public: bool,
    /// Base64 content, required unless creating a folder.
    pub data: Option<String>,
}

/// Creates records and stores their content.
#[derive(Clone)]
pub struct UploadService {
    /// Record store.
    store: Arc<dyn FileRecordStore>,
    /// Content store for originals.
    content: Arc<dyn ContentStore>,
    /// Queue for thumbnail jobs.
    publisher: Arc<dyn JobPublisher>,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService").finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        store: Arc<dyn FileRecordStore>,
        content: Arc<dyn ContentStore>,
        publisher: Arc<dyn JobPublisher>,
    ) -> Self {
        Self {
            store,
            content,
            publisher,
        }
    }

    /// Validate and create a record, storing its content if it has any.
    ///
    /// Checks run in a fixed order so that clients always see the first
    /// problem: name, type, data, then the parent.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        params: CreateFileParams,
    ) -> AppResult<FileRecord> {
        let name = params
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::validation("Missing name"))?;

        let kind = params
            .kind
            .as_deref()
            .and_then(|kind| kind.parse::<FileKind>().ok())
            .ok_or_else(|| AppError::validation("Missing type"))?;

        let data = match params.data.filter(|data| !data.is_empty()) {
            Some(data) => Some(data),
            None if kind == FileKind::Folder => None,
            None => return Err(AppError::validation("Missing data")),
        };

        let parent = self.resolve_parent(params.parent_id.as_deref()).await?;

        let local_path = match (kind.has_content(), data) {
            (true, Some(data)) => Some(self.store_content(&data).await?),
            _ => None,
        };

        let created = self
            .store
            .create(&NewFileRecord {
                user_id: ctx.user_id,
                name,
                kind,
                is_public: params.is_public,
                parent_id: parent.as_column(),
                local_path: local_path.clone(),
            })
            .await;

        let record = match created {
            Ok(record) => record,
            Err(e) => {
                if let Some(path) = local_path {
                    self.discard_content(&path).await;
                }
                return Err(e);
            }
        };

        info!(
            user_id = %ctx.user_id,
            file_id = %record.id,
            kind = %record.kind,
            "Record created"
        );

        if record.kind == FileKind::Image {
            self.enqueue_thumbnails(&record).await;
        }

        Ok(record)
    }

    /// Check that a non-root parent exists and is a folder.
    ///
    /// Any user's folder is accepted.
    async fn resolve_parent(&self, raw: Option<&str>) -> AppResult<ParentRef> {
        let Some(raw) = raw else {
            return Ok(ParentRef::Root);
        };
        let parent = ParentRef::parse(raw).ok_or_else(|| AppError::validation("Parent not found"))?;

        if let ParentRef::Folder(id) = parent {
            let folder = self
                .store
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::validation("Parent not found"))?;
            if !folder.is_folder() {
                return Err(AppError::validation("Parent is not a folder"));
            }
        }
        Ok(parent)
    }

    /// Decode base64 content and write it under a fresh name.
    async fn store_content(&self, data: &str) -> AppResult<String> {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = LENIENT_BASE64
            .decode(compact.as_bytes())
            .map_err(|_| AppError::validation("Invalid data"))?;
        self.content.put(Bytes::from(bytes)).await
    }

    /// Remove content whose record was never inserted.
    async fn discard_content(&self, path: &str) {
        if let Err(e) = self.content.remove(path).await {
            warn!(path, error = %e, "Failed to remove orphaned content");
        }
    }

    /// Queue thumbnail generation. Failures are logged and swallowed.
    async fn enqueue_thumbnails(&self, record: &FileRecord) {
        let payload = ThumbnailPayload {
            file_id: record.id,
            user_id: record.user_id,
        };
        let published = match payload.to_value() {
            Ok(value) => self.publisher.publish(THUMBNAIL_JOB, value).await,
            Err(e) => Err(e.into()),
        };
        match published {
            Ok(job_id) => {
                info!(file_id = %record.id, job_id = %job_id, "Thumbnail job enqueued");
            }
            Err(e) => {
                warn!(file_id = %record.id, error = %e, "Failed to enqueue thumbnail job");
            }
        }
    }
}
