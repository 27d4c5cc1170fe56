//! Request, response and row types shared by the handlers and services.

pub mod ai;
pub mod auth;
pub mod chart;
pub mod payment;
pub mod subscription;
pub mod template;
pub mod user;

use serde::{Deserialize, Deserializer};

pub use ai::*;
pub use auth::*;
pub use chart::*;
pub use payment::*;
pub use subscription::*;
pub use template::*;
pub use user::*;

/// PostgREST returns `null` for unset columns; treat those as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Minimal `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}
