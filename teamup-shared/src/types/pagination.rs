use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;

/// Cursor-style pagination parameters shared by the feed and message history.
///
/// The cursor is the id of the last row the caller has seen; limits are
/// validated against a per-route maximum rather than silently clamped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CursorParams {
    pub cursor: Option<Uuid>,
    pub limit: Option<i64>,
}

impl CursorParams {
    pub fn bounded_limit(&self, default: i64, max: i64) -> Result<i64, AppError> {
        bounded_limit(self.limit, default, max)
    }
}

pub fn bounded_limit(limit: Option<i64>, default: i64, max: i64) -> Result<i64, AppError> {
    let limit = limit.unwrap_or(default);
    if !(1..=max).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {max}"
        )));
    }
    Ok(limit)
}
