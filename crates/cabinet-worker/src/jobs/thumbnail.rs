//! Thumbnail generation job handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use cabinet_database::repositories::FileRecordStore;
use cabinet_entity::job::THUMBNAIL_JOB;
use cabinet_entity::job::model::Job;
use cabinet_storage::ThumbnailGenerator;

use crate::executor::{JobExecutionError, JobHandler};

/// Writes the three width derivatives for an uploaded image.
#[derive(Debug)]
pub struct ThumbnailJobHandler {
    /// Record store for locating the original.
    store: Arc<dyn FileRecordStore>,
    /// Thumbnail generator.
    generator: ThumbnailGenerator,
}

impl ThumbnailJobHandler {
    /// Create a new thumbnail job handler
    pub fn new(store: Arc<dyn FileRecordStore>, generator: ThumbnailGenerator) -> Self {
        Self { store, generator }
    }
}

/// Read a payload field, tolerating the camelCase spelling.
fn field<'a>(payload: &'a Value, snake: &str, camel: &str) -> Option<&'a Value> {
    payload
        .get(snake)
        .or_else(|| payload.get(camel))
        .filter(|v| !v.is_null())
}

fn not_found() -> JobExecutionError {
    JobExecutionError::Permanent("File not found".to_string())
}

#[async_trait]
impl JobHandler for ThumbnailJobHandler {
    fn job_type(&self) -> &str {
        THUMBNAIL_JOB
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let file_id = field(&job.payload, "file_id", "fileId")
            .ok_or_else(|| JobExecutionError::Permanent("Missing fileId".to_string()))?;
        let user_id = field(&job.payload, "user_id", "userId")
            .ok_or_else(|| JobExecutionError::Permanent("Missing userId".to_string()))?;

        let parse = |v: &Value| v.as_str().and_then(|s| Uuid::parse_str(s).ok());
        let (Some(file_id), Some(user_id)) = (parse(file_id), parse(user_id)) else {
            return Err(not_found());
        };

        let record = self
            .store
            .find_owned(file_id, user_id)
            .await?
            .ok_or_else(not_found)?;
        let original = record.local_path.as_deref().ok_or_else(not_found)?;

        let written = match self.generator.generate_all(original).await {
            Ok(paths) => paths,
            Err(e) if e.is_not_found() => {
                tracing::error!(file_id = %file_id, path = original, "Original content is missing");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(file_id = %file_id, generated = written.len(), "Thumbnails generated");
        Ok(Some(json!({ "derivatives": written })))
    }
}
