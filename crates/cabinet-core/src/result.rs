//! Convenience result type alias for Cabinet.

use crate::error::AppError;

/// A specialized `Result` type for Cabinet operations.
pub type AppResult<T> = Result<T, AppError>;
