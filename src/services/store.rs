// services/store.rs - Persistence trait for users, charts and templates

use async_trait::async_trait;

use super::ServiceError;
use crate::schemas::{
    ChartRecord, NewChart, NewTemplate, ProfileUpdateRequest, SubscriptionTier, TemplateRecord, UserRecord,
};

/// Persistence for users, charts and templates.
#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, ServiceError>;

    /// Inserts or replaces the row for `user_id` as a free user with no charts.
    async fn create_user(&self, user_id: &str, email: &str) -> Result<UserRecord, ServiceError>;

    /// Returns `Ok(false)` when `update` carries no fields. Creates the row
    /// first if it does not exist.
    async fn update_user_profile(&self, user_id: &str, update: &ProfileUpdateRequest) -> Result<bool, ServiceError>;

    async fn update_user_chart_count(&self, user_id: &str, count: i64) -> Result<bool, ServiceError>;

    async fn update_user_subscription(&self, user_id: &str, tier: SubscriptionTier) -> Result<bool, ServiceError>;

    // Charts
    /// Newest first.
    async fn get_charts_by_user(&self, user_id: &str) -> Result<Vec<ChartRecord>, ServiceError>;

    async fn get_chart_by_id(&self, chart_id: &str) -> Result<Option<ChartRecord>, ServiceError>;

    async fn create_chart(&self, chart: NewChart) -> Result<ChartRecord, ServiceError>;

    async fn delete_chart(&self, chart_id: &str) -> Result<bool, ServiceError>;

    // Templates
    /// Ordered by name.
    async fn get_all_templates(&self) -> Result<Vec<TemplateRecord>, ServiceError>;

    /// Non-premium templates ordered by name.
    async fn get_public_templates(&self) -> Result<Vec<TemplateRecord>, ServiceError>;

    async fn get_template_by_id(&self, template_id: &str) -> Result<Option<TemplateRecord>, ServiceError>;

    /// Upserts by template name and returns the number of rows written.
    async fn upsert_templates(&self, templates: &[NewTemplate]) -> Result<usize, ServiceError>;
}
