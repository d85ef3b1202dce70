//! Convenience result type alias for ShareMirror.

use crate::error::AppError;

/// A specialized `Result` type for ShareMirror operations.
pub type AppResult<T> = Result<T, AppError>;
