//! `X-Token` extractors: the raw token, and the authenticated user behind it.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use cabinet_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

/// The raw session token, if the request carries one.
///
/// Used where anonymous access is allowed.
#[derive(Debug, Clone, Default)]
pub struct Token(pub Option<String>);

impl Token {
    /// Borrow the token.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Token {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(Token(token))
    }
}

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Token(token) = Token::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        let user_id = state.resolver.authenticate(token.as_deref()).await?;
        Ok(AuthUser(RequestContext::new(user_id)))
    }
}
