//! Liveness and usage figures for operators.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use cabinet_cache::provider::CacheManager;
use cabinet_core::result::AppResult;
use cabinet_core::traits::CacheProvider;
use cabinet_database::repositories::FileRecordStore;

/// Reachability of the backing stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    /// Credential store answered.
    pub redis: bool,
    /// Record store answered.
    pub db: bool,
}

/// Record counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    /// Total records.
    pub files: u64,
    /// Distinct owners among them.
    pub owners: u64,
}

/// Reports store health and usage.
#[derive(Debug, Clone)]
pub struct StatusService {
    cache: Arc<CacheManager>,
    store: Arc<dyn FileRecordStore>,
}

impl StatusService {
    /// Creates a new status service.
    pub fn new(cache: Arc<CacheManager>, store: Arc<dyn FileRecordStore>) -> Self {
        Self { cache, store }
    }

    /// Check both stores. A failed check reads as `false`, never an error.
    pub async fn status(&self) -> ServiceStatus {
        let (redis, db) = tokio::join!(self.cache.health_check(), self.store.health_check());
        ServiceStatus {
            redis: redis.unwrap_or_else(|e| {
                warn!(error = %e, "Credential store health check failed");
                false
            }),
            db: db.unwrap_or_else(|e| {
                warn!(error = %e, "Record store health check failed");
                false
            }),
        }
    }

    /// Count records and owners.
    pub async fn stats(&self) -> AppResult<UsageStats> {
        Ok(UsageStats {
            files: self.store.count().await?,
            owners: self.store.count_owners().await?,
        })
    }
}
