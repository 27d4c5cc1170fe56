// handlers/mod.rs - HTTP handlers grouped by route prefix

pub mod ai;
pub mod auth;
pub mod charts;
pub mod docs;
pub mod payment;
pub mod profile;
pub mod subscription;
pub mod system;
pub mod templates;

use crate::error::ApiError;
use crate::schemas::is_valid_email;

pub(crate) fn require_valid_email(email: &str) -> Result<(), ApiError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::invalid_field("email", "value is not a valid email address"))
    }
}
