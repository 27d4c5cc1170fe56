use serde::{Deserialize, Serialize};

use super::user::{SubscriptionTier, UserRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: String,
    pub email: String,
    pub subscription_tier: SubscriptionTier,
    pub chart_count: i64,
}

impl LoginResponse {
    pub fn bearer(access_token: String, user: &UserRecord) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user_id: user.id.clone(),
            email: user.email.clone(),
            subscription_tier: user.subscription_tier,
            chart_count: user.chart_count,
        }
    }
}
