// services/memory.rs - In-memory store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::Store;
use super::ServiceError;
use crate::schemas::{
    ChartRecord, NewChart, NewTemplate, ProfileUpdateRequest, SubscriptionTier, TemplateRecord, UserRecord,
};

/// Process-local store used for development without Supabase and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    charts: RwLock<HashMap<String, ChartRecord>>,
    templates: RwLock<HashMap<String, TemplateRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the built-in template catalog.
    pub fn with_catalog() -> Self {
        let templates = crate::catalog::build_templates()
            .into_iter()
            .map(|template| {
                let record = template_record(Uuid::new_v4().to_string(), template);
                (record.id.clone(), record)
            })
            .collect();

        Self { templates: RwLock::new(templates), ..Self::default() }
    }

    async fn sorted_templates(&self, include_premium: bool) -> Vec<TemplateRecord> {
        let templates = self.templates.read().await;
        let mut list: Vec<TemplateRecord> =
            templates.values().filter(|t| include_premium || !t.is_premium).cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    async fn modify_user<F>(&self, user_id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) => {
                apply(user);
                true
            }
            None => false,
        }
    }
}

fn template_record(id: String, template: NewTemplate) -> TemplateRecord {
    TemplateRecord {
        id,
        name: template.name,
        description: template.description,
        chart_type: template.chart_type,
        is_premium: template.is_premium,
        example_data: template.example_data,
        thumbnail_url: template.thumbnail_url,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, ServiceError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn create_user(&self, user_id: &str, email: &str) -> Result<UserRecord, ServiceError> {
        let mut user = UserRecord::basic(user_id, email);
        user.created_at = Some(Utc::now());
        self.users.write().await.insert(user_id.to_string(), user.clone());
        Ok(user)
    }

    async fn update_user_profile(&self, user_id: &str, update: &ProfileUpdateRequest) -> Result<bool, ServiceError> {
        if update.is_empty() {
            return Ok(false);
        }
        if self.get_user_by_id(user_id).await?.is_none() {
            self.create_user(user_id, "").await?;
        }

        Ok(self
            .modify_user(user_id, |user| {
                if let Some(first_name) = &update.first_name {
                    user.first_name = Some(first_name.clone());
                }
                if let Some(last_name) = &update.last_name {
                    user.last_name = Some(last_name.clone());
                }
            })
            .await)
    }

    async fn update_user_chart_count(&self, user_id: &str, count: i64) -> Result<bool, ServiceError> {
        Ok(self.modify_user(user_id, |user| user.chart_count = count).await)
    }

    async fn update_user_subscription(&self, user_id: &str, tier: SubscriptionTier) -> Result<bool, ServiceError> {
        Ok(self.modify_user(user_id, |user| user.subscription_tier = tier).await)
    }

    async fn get_charts_by_user(&self, user_id: &str) -> Result<Vec<ChartRecord>, ServiceError> {
        let charts = self.charts.read().await;
        let mut list: Vec<ChartRecord> = charts.values().filter(|c| c.user_id == user_id).cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn get_chart_by_id(&self, chart_id: &str) -> Result<Option<ChartRecord>, ServiceError> {
        Ok(self.charts.read().await.get(chart_id).cloned())
    }

    async fn create_chart(&self, chart: NewChart) -> Result<ChartRecord, ServiceError> {
        let record = ChartRecord {
            id: Uuid::new_v4().to_string(),
            user_id: chart.user_id,
            template_id: chart.template_id,
            input_data: chart.input_data,
            result_visual: chart.result_visual,
            result_code: chart.result_code,
            created_at: Some(Utc::now()),
        };
        self.charts.write().await.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn delete_chart(&self, chart_id: &str) -> Result<bool, ServiceError> {
        Ok(self.charts.write().await.remove(chart_id).is_some())
    }

    async fn get_all_templates(&self) -> Result<Vec<TemplateRecord>, ServiceError> {
        Ok(self.sorted_templates(true).await)
    }

    async fn get_public_templates(&self) -> Result<Vec<TemplateRecord>, ServiceError> {
        Ok(self.sorted_templates(false).await)
    }

    async fn get_template_by_id(&self, template_id: &str) -> Result<Option<TemplateRecord>, ServiceError> {
        Ok(self.templates.read().await.get(template_id).cloned())
    }

    async fn upsert_templates(&self, templates: &[NewTemplate]) -> Result<usize, ServiceError> {
        let mut stored = self.templates.write().await;
        for template in templates {
            let id = stored
                .values()
                .find(|existing| existing.name == template.name)
                .map(|existing| existing.id.clone())
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            stored.insert(id.clone(), template_record(id, template.clone()));
        }
        Ok(templates.len())
    }
}
