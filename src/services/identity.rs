// services/identity.rs - Identity provider trait (sign in, sign up, token lookup)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub user: IdentityUser,
}

#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: IdentityUser,
    /// Absent while the account awaits e-mail confirmation.
    pub access_token: Option<String>,
}

/// Account sign-in, sign-up and token introspection.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ServiceError>;

    /// Resolves an access token to its user. `Ok(None)` means the provider
    /// does not recognise the token.
    async fn get_user(&self, access_token: &str) -> Result<Option<IdentityUser>, ServiceError>;
}
