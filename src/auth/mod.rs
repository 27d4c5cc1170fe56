use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::config::SecurityConfig;

/// Token claims. Supabase-issued tokens carry `role` and `aud` as well, which
/// are accepted but not required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id.into(),
            email,
            role: Some("authenticated".to_string()),
            aud: Some("authenticated".to_string()),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// Resolves the configured algorithm name. Only HMAC algorithms can be used
/// with a shared secret, anything else falls back to HS256.
pub fn signing_algorithm(security: &SecurityConfig) -> Algorithm {
    match Algorithm::from_str(security.jwt_algorithm.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
        _ => {
            tracing::warn!(
                "Unsupported JWT algorithm '{}', falling back to HS256",
                security.jwt_algorithm
            );
            Algorithm::HS256
        }
    }
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    let header = Header::new(signing_algorithm(security));

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Mints a token for `user_id` using the configured expiry.
pub fn issue_token(user_id: &str, email: Option<&str>, security: &SecurityConfig) -> Result<String, JwtError> {
    let claims = Claims::new(user_id, email.map(str::to_string), security.jwt_expiry_hours);
    generate_jwt(&claims, security)
}

pub fn decode_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::new(signing_algorithm(security));
    validation.validate_aud = false;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}
