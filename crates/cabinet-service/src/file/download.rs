//! Content download with visibility enforcement and thumbnail selection.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use cabinet_auth::TokenResolver;
use cabinet_core::error::AppError;
use cabinet_core::result::AppResult;
use cabinet_core::traits::ContentStore;
use cabinet_database::repositories::FileRecordStore;
use cabinet_entity::file::FileRecord;
use cabinet_storage::thumbnail::{derivative_path, width_from_query};

use super::{NOT_FOUND, parse_record_id};

/// Message returned when content is requested for a folder.
pub const FOLDER_HAS_NO_CONTENT: &str = "A folder doesn't have content";

/// Serves stored bytes for records the caller may see.
#[derive(Clone)]
pub struct DownloadService {
    /// Record store.
    store: Arc<dyn FileRecordStore>,
    /// Content store.
    content: Arc<dyn ContentStore>,
    /// Token resolver for private records.
    resolver: Arc<TokenResolver>,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

/// Result containing record metadata and content bytes for a download.
#[derive(Debug)]
pub struct DownloadResult {
    /// The record served.
    pub record: FileRecord,
    /// Content bytes (original or derivative).
    pub data: Bytes,
    /// MIME type guessed from the record name.
    pub content_type: String,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        store: Arc<dyn FileRecordStore>,
        content: Arc<dyn ContentStore>,
        resolver: Arc<TokenResolver>,
    ) -> Self {
        Self {
            store,
            content,
            resolver,
        }
    }

    /// Read the content of a record.
    ///
    /// Private records are only served to their owner; anyone else gets
    /// the same `NotFound` as for a missing record. `size` selects a
    /// thumbnail width and is ignored unless it is one of the generated
    /// widths.
    pub async fn download(
        &self,
        id: &str,
        token: Option<&str>,
        size: Option<&str>,
    ) -> AppResult<DownloadResult> {
        let id = parse_record_id(id)?;
        let record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

        if !record.is_public && !self.is_owner(&record, token).await? {
            return Err(AppError::not_found(NOT_FOUND));
        }

        if record.is_folder() {
            return Err(AppError::validation(FOLDER_HAS_NO_CONTENT));
        }

        let original = record
            .local_path
            .as_deref()
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        let path = match size.and_then(width_from_query) {
            Some(width) => derivative_path(original, width),
            None => original.to_string(),
        };

        let data = self.content.read_bytes(&path).await.map_err(|e| {
            if e.is_not_found() {
                AppError::not_found(NOT_FOUND)
            } else {
                e
            }
        })?;

        let content_type = mime_guess::from_path(&record.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        debug!(file_id = %record.id, path = %path, bytes = data.len(), "Serving content");
        Ok(DownloadResult {
            record,
            data,
            content_type,
        })
    }

    async fn is_owner(&self, record: &FileRecord, token: Option<&str>) -> AppResult<bool> {
        let Some(token) = token else {
            return Ok(false);
        };
        Ok(self.resolver.resolve(token).await? == Some(record.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::CreateFileParams;
    use crate::testing::Fixture;
    use cabinet_core::error::ErrorKind;

    fn upload(name: &str, kind: &str, data: &str, is_public: bool) -> CreateFileParams {
        CreateFileParams {
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            data: Some(data.to_string()),
            is_public,
            ..CreateFileParams::default()
        }
    }

    #[tokio::test]
    async fn test_owner_round_trips_bytes() {
        let fx = Fixture::new().await;
        let (token, ctx) = fx.login().await;
        let record = fx
            .upload()
            .create(&ctx, upload("notes.txt", "file", "aGVsbG8gd29ybGQ=", false))
            .await
            .unwrap();

        let result = fx
            .downloads()
            .download(&record.id.to_string(), Some(&token), None)
            .await
            .unwrap();
        assert_eq!(result.data, Bytes::from("hello world"));
        assert_eq!(result.content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_private_record_is_hidden() {
        let fx = Fixture::new().await;
        let (_, owner) = fx.login().await;
        let (other_token, _) = fx.login().await;
        let record = fx
            .upload()
            .create(&owner, upload("secret.bin", "file", "AAEC", false))
            .await
            .unwrap();
        let id = record.id.to_string();

        for token in [None, Some(other_token.as_str()), Some("unknown")] {
            let err = fx.downloads().download(&id, token, None).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::NotFound);
            assert_eq!(err.message, NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_public_record_needs_no_token() {
        let fx = Fixture::new().await;
        let record = fx
            .upload()
            .create(&fx.ctx(), upload("blob", "file", "AAEC", true))
            .await
            .unwrap();

        let result = fx
            .downloads()
            .download(&record.id.to_string(), None, None)
            .await
            .unwrap();
        assert_eq!(result.data, Bytes::from_static(&[0, 1, 2]));
        assert_eq!(result.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_folder_has_no_content() {
        let fx = Fixture::new().await;
        let (token, ctx) = fx.login().await;
        let record = fx
            .upload()
            .create(
                &ctx,
                CreateFileParams {
                    name: Some("dir".into()),
                    kind: Some("folder".into()),
                    ..CreateFileParams::default()
                },
            )
            .await
            .unwrap();

        let err = fx
            .downloads()
            .download(&record.id.to_string(), Some(&token), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, FOLDER_HAS_NO_CONTENT);
    }

    #[tokio::test]
    async fn test_size_selects_derivative_or_falls_back() {
        let fx = Fixture::new().await;
        let record = fx
            .upload()
            .create(&fx.ctx(), upload("pic.png", "image", "b3JpZ2luYWw=", true))
            .await
            .unwrap();
        let original = record.local_path.clone().unwrap();
        fx.content
            .write(&derivative_path(&original, 250), Bytes::from("small"))
            .await
            .unwrap();
        let id = record.id.to_string();
        let downloads = fx.downloads();

        let thumb = downloads.download(&id, None, Some("250")).await.unwrap();
        assert_eq!(thumb.data, Bytes::from("small"));
        assert_eq!(thumb.content_type, "image/png");

        let fallback = downloads.download(&id, None, Some("300")).await.unwrap();
        assert_eq!(fallback.data, Bytes::from("original"));

        let missing = downloads.download(&id, None, Some("500")).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_content_is_not_found() {
        let fx = Fixture::new().await;
        let record = fx
            .upload()
            .create(&fx.ctx(), upload("gone.txt", "file", "eA==", true))
            .await
            .unwrap();
        tokio::fs::remove_file(record.local_path.as_deref().unwrap())
            .await
            .unwrap();

        let err = fx
            .downloads()
            .download(&record.id.to_string(), None, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let fx = Fixture::new().await;
        let missing = uuid::Uuid::new_v4().to_string();
        for id in ["nope", missing.as_str()] {
            let err = fx.downloads().download(id, None, None).await.unwrap_err();
            assert!(err.is_not_found());
        }
    }
}
