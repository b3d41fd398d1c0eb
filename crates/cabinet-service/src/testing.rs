//! Shared fixtures for service tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use cabinet_auth::TokenResolver;
use cabinet_cache::keys;
use cabinet_cache::memory::MemoryCacheProvider;
use cabinet_cache::provider::CacheManager;
use cabinet_core::config::cache::MemoryCacheConfig;
use cabinet_core::error::AppError;
use cabinet_core::result::AppResult;
use cabinet_core::traits::{CacheProvider, ContentStore, JobPublisher};
use cabinet_database::repositories::{FileRecordStore, MemoryFileRepository};
use cabinet_entity::file::{FileRecord, NewFileRecord};
use cabinet_storage::LocalStorageProvider;

use crate::context::RequestContext;
use crate::file::{DownloadService, FileService, UploadService};
use crate::status::StatusService;

/// Publisher that records jobs, or refuses them.
#[derive(Debug, Default)]
pub(crate) struct RecordingPublisher {
    jobs: Mutex<Vec<(String, serde_json::Value)>>,
    fail: bool,
}

impl RecordingPublisher {
    pub(crate) fn jobs(&self) -> Vec<(String, serde_json::Value)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobPublisher for RecordingPublisher {
    async fn publish(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Uuid> {
        if self.fail {
            return Err(AppError::queue("queue unavailable"));
        }
        self.jobs
            .lock()
            .unwrap()
            .push((job_type.to_string(), payload));
        Ok(Uuid::new_v4())
    }
}

/// Record store whose writes always fail; reads see an empty store.
#[derive(Debug, Default)]
pub(crate) struct ReadOnlyStore;

#[async_trait]
impl FileRecordStore for ReadOnlyStore {
    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<FileRecord>> {
        Ok(None)
    }

    async fn find_owned(&self, _id: Uuid, _user_id: Uuid) -> AppResult<Option<FileRecord>> {
        Ok(None)
    }

    async fn find_children(
        &self,
        _user_id: Uuid,
        _parent_id: Option<Uuid>,
        _offset: u64,
        _limit: u64,
    ) -> AppResult<Vec<FileRecord>> {
        Ok(Vec::new())
    }

    async fn create(&self, _data: &NewFileRecord) -> AppResult<FileRecord> {
        Err(AppError::database("database is read-only"))
    }

    async fn set_visibility(
        &self,
        _id: Uuid,
        _user_id: Uuid,
        _is_public: bool,
    ) -> AppResult<Option<FileRecord>> {
        Err(AppError::database("database is read-only"))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(0)
    }

    async fn count_owners(&self) -> AppResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

pub(crate) struct Fixture {
    _dir: tempfile::TempDir,
    local: Arc<LocalStorageProvider>,
    pub store: Arc<dyn FileRecordStore>,
    pub content: Arc<dyn ContentStore>,
    pub cache: Arc<CacheManager>,
    pub publisher: Arc<RecordingPublisher>,
}

impl Fixture {
    pub(crate) async fn new() -> Self {
        Self::build(RecordingPublisher::default()).await
    }

    pub(crate) async fn with_failing_publisher() -> Self {
        Self::build(RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        })
        .await
    }

    async fn build(publisher: RecordingPublisher) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(
            LocalStorageProvider::new(dir.path().join("files").to_str().unwrap())
                .await
                .unwrap(),
        );
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 100 });
        Self {
            _dir: dir,
            content: local.clone(),
            local,
            store: Arc::new(MemoryFileRepository::new()),
            cache: Arc::new(CacheManager::from_provider(Arc::new(provider))),
            publisher: Arc::new(publisher),
        }
    }

    pub(crate) fn root(&self) -> &std::path::Path {
        self.local.root()
    }

    /// A context for a fresh user.
    pub(crate) fn ctx(&self) -> RequestContext {
        RequestContext::new(Uuid::new_v4())
    }

    /// Register a token for a fresh user.
    pub(crate) async fn login(&self) -> (String, RequestContext) {
        let ctx = self.ctx();
        let token = Uuid::new_v4().to_string();
        self.cache
            .set(
                &keys::auth_token(&token),
                &ctx.user_id.to_string(),
                Duration::from_secs(3600),
            )
            .await
            .unwrap();
        (token, ctx)
    }

    pub(crate) fn upload(&self) -> UploadService {
        UploadService::new(self.store.clone(), self.content.clone(), self.publisher.clone())
    }

    pub(crate) fn files(&self) -> FileService {
        FileService::new(self.store.clone())
    }

    pub(crate) fn downloads(&self) -> DownloadService {
        DownloadService::new(
            self.store.clone(),
            self.content.clone(),
            Arc::new(TokenResolver::new(self.cache.clone())),
        )
    }

    pub(crate) fn status(&self) -> StatusService {
        StatusService::new(self.cache.clone(), self.store.clone())
    }
}
