// services/local_identity.rs - In-memory identity provider for development and tests

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::identity::{AuthSession, IdentityProvider, IdentityUser, SignUpOutcome};
use super::ServiceError;
use crate::auth::{decode_jwt, issue_token};
use crate::config::SecurityConfig;

#[derive(Debug, Clone)]
struct LocalAccount {
    id: String,
    email: String,
    password_hash: String,
}

/// Development identity provider: accounts live in memory and tokens are
/// signed with the configured JWT secret. Not meant for production use.
#[derive(Debug)]
pub struct LocalIdentity {
    security: SecurityConfig,
    accounts: RwLock<HashMap<String, LocalAccount>>,
}

impl LocalIdentity {
    pub fn new(security: SecurityConfig) -> Self {
        Self { security, accounts: RwLock::new(HashMap::new()) }
    }

    fn token_for(&self, account: &LocalAccount) -> Result<String, ServiceError> {
        issue_token(&account.id, Some(&account.email), &self.security)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

/// Hash a password for storage
///
/// bcrypt is deliberately slow, so the work runs on the blocking pool
/// instead of stalling the async workers.
async fn hash_password(password: &str, cost: u32) -> Result<String, ServiceError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ServiceError::InvalidResponse(format!("Password hashing failed: {}", e)))?
        .map_err(|e| ServiceError::InvalidResponse(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored bcrypt hash
async fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ServiceError::InvalidResponse(format!("Password verification failed: {}", e)))?
        .map_err(|e| ServiceError::InvalidResponse(format!("Password verification failed: {}", e)))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Rejected("Invalid login credentials".to_string())
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError> {
        let account = self
            .accounts
            .read()
            .await
            .get(&normalize_email(email))
            .cloned()
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &account.password_hash).await? {
            return Err(invalid_credentials());
        }

        Ok(AuthSession {
            access_token: self.token_for(&account)?,
            user: IdentityUser { id: account.id.clone(), email: Some(account.email.clone()) },
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ServiceError> {
        if password.len() < 6 {
            return Err(ServiceError::Rejected("Password should be at least 6 characters".to_string()));
        }

        let email = normalize_email(email);
        let already_registered = || ServiceError::Rejected("User already registered".to_string());
        if self.accounts.read().await.contains_key(&email) {
            return Err(already_registered());
        }

        let account = LocalAccount {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash: hash_password(password, self.security.password_hash_cost).await?,
        };
        let access_token = self.token_for(&account)?;
        let user = IdentityUser { id: account.id.clone(), email: Some(email.clone()) };

        // Re-checked under the write lock; a concurrent sign-up may have won
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(already_registered());
        }
        accounts.insert(email, account);

        Ok(SignUpOutcome { user, access_token: Some(access_token) })
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<IdentityUser>, ServiceError> {
        Ok(decode_jwt(access_token, &self.security)
            .ok()
            .map(|claims| IdentityUser { id: claims.sub, email: claims.email }))
    }
}
