//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use cabinet_auth::TokenResolver;
use cabinet_cache::provider::CacheManager;
use cabinet_core::config::AppConfig;
use cabinet_core::traits::{ContentStore, JobPublisher};
use cabinet_database::repositories::FileRecordStore;
use cabinet_service::{DownloadService, FileService, StatusService, UploadService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session token resolver
    pub resolver: Arc<TokenResolver>,
    /// Record creation
    pub upload_service: Arc<UploadService>,
    /// Owner-scoped reads and visibility
    pub file_service: Arc<FileService>,
    /// Content download
    pub download_service: Arc<DownloadService>,
    /// Health and usage
    pub status_service: Arc<StatusService>,
}

impl AppState {
    /// Wire the services from their backing stores.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn FileRecordStore>,
        content: Arc<dyn ContentStore>,
        cache: Arc<CacheManager>,
        publisher: Arc<dyn JobPublisher>,
    ) -> Self {
        let resolver = Arc::new(TokenResolver::new(Arc::clone(&cache)));

        Self {
            config: Arc::new(config),
            upload_service: Arc::new(UploadService::new(
                Arc::clone(&store),
                Arc::clone(&content),
                publisher,
            )),
            file_service: Arc::new(FileService::new(Arc::clone(&store))),
            download_service: Arc::new(DownloadService::new(
                Arc::clone(&store),
                content,
                Arc::clone(&resolver),
            )),
            status_service: Arc::new(StatusService::new(cache, store)),
            resolver,
        }
    }
}
