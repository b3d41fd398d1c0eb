//! Shared harness for the HTTP tests: an in-memory record store, an
//! in-memory credential store and a temporary content directory.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use cabinet_api::{AppState, build_router};
use cabinet_cache::keys;
use cabinet_cache::memory::MemoryCacheProvider;
use cabinet_cache::provider::CacheManager;
use cabinet_core::config::AppConfig;
use cabinet_core::config::cache::MemoryCacheConfig;
use cabinet_core::result::AppResult;
use cabinet_core::traits::{CacheProvider, ContentStore, JobPublisher};
use cabinet_database::repositories::{FileRecordStore, MemoryFileRepository};
use cabinet_storage::LocalStorageProvider;

/// Publisher that keeps every job in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    jobs: Mutex<Vec<(String, Value)>>,
}

impl RecordingPublisher {
    pub fn jobs(&self) -> Vec<(String, Value)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobPublisher for RecordingPublisher {
    async fn publish(&self, job_type: &str, payload: Value) -> AppResult<Uuid> {
        self.jobs
            .lock()
            .unwrap()
            .push((job_type.to_string(), payload));
        Ok(Uuid::new_v4())
    }
}

pub struct TestApp {
    _dir: tempfile::TempDir,
    pub router: Router,
    pub store: Arc<dyn FileRecordStore>,
    pub content: Arc<dyn ContentStore>,
    pub cache: Arc<CacheManager>,
    pub publisher: Arc<RecordingPublisher>,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStorageProvider::new(dir.path().join("files").to_str().unwrap())
            .await
            .unwrap();
        let content: Arc<dyn ContentStore> = Arc::new(local);
        let store: Arc<dyn FileRecordStore> = Arc::new(MemoryFileRepository::new());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 100 }),
        )));
        let publisher = Arc::new(RecordingPublisher::default());

        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "database": { "url": "postgres://localhost/cabinet_test" },
        }))
        .unwrap();

        let state = AppState::new(
            config,
            store.clone(),
            content.clone(),
            cache.clone(),
            publisher.clone(),
        );

        Self {
            _dir: dir,
            router: build_router(state),
            store,
            content,
            cache,
            publisher,
        }
    }

    /// Register a session for a fresh user and return its token.
    pub async fn login(&self) -> (String, Uuid) {
        let user_id = Uuid::new_v4();
        let token = Uuid::new_v4().to_string();
        self.cache
            .set(
                &keys::auth_token(&token),
                &user_id.to_string(),
                Duration::from_secs(3600),
            )
            .await
            .unwrap();
        (token, user_id)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            content_type,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::PUT, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    /// Create a record and return its JSON view, asserting success.
    pub async fn create(&self, token: &str, body: Value) -> Value {
        let response = self.post("/files", Some(token), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.json()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-token", token);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// A solid PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 120, 200]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
