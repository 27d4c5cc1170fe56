use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::null_as_default;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
        }
    }

    pub fn is_pro(&self) -> bool {
        matches!(self, SubscriptionTier::Pro)
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of `graphzy_users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscription_tier: SubscriptionTier,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chart_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Stand-in used when the users table has no row for an authenticated id.
    pub fn basic(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            subscription_tier: SubscriptionTier::Free,
            chart_count: 0,
            created_at: None,
        }
    }

    pub fn is_pro(&self) -> bool {
        self.subscription_tier.is_pro()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub chart_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            subscription_tier: user.subscription_tier,
            chart_count: user.chart_count,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    pub success: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_row_with_nulls_uses_defaults() {
        let row: UserRecord = serde_json::from_value(json!({
            "id": "6f1c9d0e-0000-4000-8000-000000000001",
            "email": null,
            "subscription_tier": null,
            "chart_count": null,
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        }))
        .unwrap();
        assert_eq!(row.email, "");
        assert_eq!(row.subscription_tier, SubscriptionTier::Free);
        assert_eq!(row.chart_count, 0);
        assert!(row.created_at.is_some());
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        assert_eq!(serde_json::to_value(SubscriptionTier::Pro).unwrap(), json!("pro"));
        let tier: SubscriptionTier = serde_json::from_value(json!("free")).unwrap();
        assert_eq!(tier, SubscriptionTier::Free);
    }
}
