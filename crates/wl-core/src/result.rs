//! Result type aliases

use crate::error::WlError;

/// Standard Result type for dashboard operations
pub type WlResult<T> = Result<T, WlError>;
