//! # cabinet-api
//!
//! HTTP API layer for Cabinet built on Axum.
//!
//! Provides the file and status endpoints, the `X-Token` extractors,
//! request/response DTOs, error mapping and the CORS and logging
//! middleware.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
