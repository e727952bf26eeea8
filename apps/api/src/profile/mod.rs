// Profile editor backend: one JSONB document per user, written through
// partial patches so sibling sections never overwrite each other.

pub mod handlers;
pub mod patch;
pub mod personal_info;
pub mod sections;
pub mod store;

use crate::errors::AppError;

/// Returns the trimmed user id, or the 400 every profile endpoint answers
/// when it is missing.
pub fn require_user_id(user_id: Option<&str>) -> Result<String, AppError> {
    match user_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(AppError::Validation("User ID required".to_string())),
    }
}
