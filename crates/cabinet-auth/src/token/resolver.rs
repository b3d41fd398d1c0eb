//! Resolves session tokens to user ids through the credential store.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use cabinet_cache::keys;
use cabinet_cache::provider::CacheManager;
use cabinet_core::error::AppError;
use cabinet_core::result::AppResult;
use cabinet_core::traits::CacheProvider;

/// Message returned for every authentication failure.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Looks up the user behind a session token.
#[derive(Debug, Clone)]
pub struct TokenResolver {
    /// Credential store.
    cache: Arc<CacheManager>,
}

impl TokenResolver {
    /// Creates a new resolver over the credential store.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Resolve a token to its user id.
    ///
    /// Returns `None` for an empty token, an unknown token, or a stored
    /// value that is not a user id. Store failures are propagated.
    pub async fn resolve(&self, token: &str) -> AppResult<Option<Uuid>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let Some(value) = self.cache.get(&keys::auth_token(token)).await? else {
            return Ok(None);
        };

        match Uuid::parse_str(value.trim()) {
            Ok(user_id) => Ok(Some(user_id)),
            Err(_) => {
                debug!("Credential store holds a malformed user id");
                Ok(None)
            }
        }
    }

    /// Resolve an optional token, failing with `Unauthorized` when it does
    /// not map to a user.
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<Uuid> {
        let Some(token) = token else {
            return Err(AppError::authentication(UNAUTHORIZED));
        };
        self.resolve(token)
            .await?
            .ok_or_else(|| AppError::authentication(UNAUTHORIZED))
    }
}
