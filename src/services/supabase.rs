// services/supabase.rs - Supabase PostgREST store and GoTrue identity provider

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;
use uuid::Uuid;

use super::identity::{AuthSession, IdentityProvider, IdentityUser, SignUpOutcome};
use super::store::Store;
use super::{http_client, ServiceError};
use crate::config::SupabaseConfig;
use crate::schemas::{
    ChartRecord, NewChart, NewTemplate, ProfileUpdateRequest, SubscriptionTier, TemplateRecord, UserRecord,
};

const USERS_TABLE: &str = "graphzy_users";
const CHARTS_TABLE: &str = "graphzy_charts";
const TEMPLATES_TABLE: &str = "graphzy_templates";

const RETURN_ROWS: &str = "return=representation";
const UPSERT_ROWS: &str = "resolution=merge-duplicates,return=representation";

/// Client for a Supabase project: PostgREST for table access and GoTrue for
/// accounts. Requests are made with the service role key.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    access_token: String,
    user: IdentityUser,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig, timeout_secs: u64) -> Result<Self, ServiceError> {
        if !config.is_configured() {
            return Err(ServiceError::NotConfigured("Supabase"));
        }

        let base_url = Url::parse(config.url.trim())
            .map_err(|e| ServiceError::InvalidResponse(format!("invalid SUPABASE_URL: {}", e)))?;

        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }

    fn rest(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn auth(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.service_key)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>, ServiceError> {
        let response = self.rest(Method::GET, table).query(query).send().await?;
        read_json(response).await
    }

    async fn select_one<T: DeserializeOwned>(&self, table: &str, id: &str) -> Result<Option<T>, ServiceError> {
        let query = [("select", "*".to_string()), ("id", eq(id)), ("limit", "1".to_string())];
        Ok(self.select(table, &query).await?.into_iter().next())
    }

    async fn update_user(&self, user_id: &str, changes: Value) -> Result<bool, ServiceError> {
        if !is_uuid(user_id) {
            return Ok(false);
        }
        let response = self
            .rest(Method::PATCH, USERS_TABLE)
            .query(&[("id", eq(user_id))])
            .header("Prefer", RETURN_ROWS)
            .json(&changes)
            .send()
            .await?;
        let rows: Vec<Value> = read_json(response).await?;
        Ok(!rows.is_empty())
    }
}

/// Row ids are uuid columns; anything else cannot match and PostgREST would
/// answer 400.
fn is_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

#[async_trait]
impl Store for SupabaseClient {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, ServiceError> {
        if !is_uuid(user_id) {
            return Ok(None);
        }
        self.select_one(USERS_TABLE, user_id).await
    }

    async fn create_user(&self, user_id: &str, email: &str) -> Result<UserRecord, ServiceError> {
        let row = json!({
            "id": user_id,
            "email": email,
            "subscription_tier": SubscriptionTier::Free,
            "chart_count": 0
        });
        let response = self
            .rest(Method::POST, USERS_TABLE)
            .query(&[("on_conflict", "id")])
            .header("Prefer", UPSERT_ROWS)
            .json(&row)
            .send()
            .await?;
        let rows: Vec<UserRecord> = read_json(response).await?;
        Ok(rows.into_iter().next().unwrap_or_else(|| UserRecord::basic(user_id, email)))
    }

    async fn update_user_profile(&self, user_id: &str, update: &ProfileUpdateRequest) -> Result<bool, ServiceError> {
        let mut changes = Map::new();
        if let Some(first_name) = &update.first_name {
            changes.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = &update.last_name {
            changes.insert("last_name".to_string(), json!(last_name));
        }
        if changes.is_empty() || !is_uuid(user_id) {
            return Ok(false);
        }

        if self.get_user_by_id(user_id).await?.is_none() {
            self.create_user(user_id, "").await?;
        }

        self.update_user(user_id, Value::Object(changes)).await
    }

    async fn update_user_chart_count(&self, user_id: &str, count: i64) -> Result<bool, ServiceError> {
        self.update_user(user_id, json!({ "chart_count": count })).await
    }

    async fn update_user_subscription(&self, user_id: &str, tier: SubscriptionTier) -> Result<bool, ServiceError> {
        self.update_user(user_id, json!({ "subscription_tier": tier })).await
    }

    async fn get_charts_by_user(&self, user_id: &str) -> Result<Vec<ChartRecord>, ServiceError> {
        let query = [
            ("select", "*".to_string()),
            ("user_id", eq(user_id)),
            ("order", "created_at.desc".to_string()),
        ];
        self.select(CHARTS_TABLE, &query).await
    }

    async fn get_chart_by_id(&self, chart_id: &str) -> Result<Option<ChartRecord>, ServiceError> {
        if !is_uuid(chart_id) {
            return Ok(None);
        }
        self.select_one(CHARTS_TABLE, chart_id).await
    }

    async fn create_chart(&self, chart: NewChart) -> Result<ChartRecord, ServiceError> {
        let response = self
            .rest(Method::POST, CHARTS_TABLE)
            .header("Prefer", RETURN_ROWS)
            .json(&chart)
            .send()
            .await?;
        let rows: Vec<ChartRecord> = read_json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ServiceError::InvalidResponse("chart insert returned no rows".to_string()))
    }

    async fn delete_chart(&self, chart_id: &str) -> Result<bool, ServiceError> {
        let response = self
            .rest(Method::DELETE, CHARTS_TABLE)
            .query(&[("id", eq(chart_id))])
            .header("Prefer", RETURN_ROWS)
            .send()
            .await?;
        let rows: Vec<Value> = read_json(response).await?;
        Ok(!rows.is_empty())
    }

    async fn get_all_templates(&self) -> Result<Vec<TemplateRecord>, ServiceError> {
        let query = [("select", "*".to_string()), ("order", "name.asc".to_string())];
        self.select(TEMPLATES_TABLE, &query).await
    }

    async fn get_public_templates(&self) -> Result<Vec<TemplateRecord>, ServiceError> {
        let query = [
            ("select", "*".to_string()),
            ("is_premium", "eq.false".to_string()),
            ("order", "name.asc".to_string()),
        ];
        self.select(TEMPLATES_TABLE, &query).await
    }

    async fn get_template_by_id(&self, template_id: &str) -> Result<Option<TemplateRecord>, ServiceError> {
        if !is_uuid(template_id) {
            return Ok(None);
        }
        self.select_one(TEMPLATES_TABLE, template_id).await
    }

    async fn upsert_templates(&self, templates: &[NewTemplate]) -> Result<usize, ServiceError> {
        if templates.is_empty() {
            return Ok(0);
        }
        let response = self
            .rest(Method::POST, TEMPLATES_TABLE)
            .query(&[("on_conflict", "name")])
            .header("Prefer", UPSERT_ROWS)
            .json(templates)
            .send()
            .await?;
        let rows: Vec<Value> = read_json(response).await?;
        Ok(rows.len())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError> {
        let response = self
            .auth(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: SessionPayload = read_auth_json(response).await?;
        Ok(AuthSession { access_token: session.access_token, user: session.user })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ServiceError> {
        let response = self
            .auth(Method::POST, "signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: Value = read_auth_json(response).await?;
        parse_sign_up(body)
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<IdentityUser>, ServiceError> {
        let response = self.auth(Method::GET, "user").bearer_auth(access_token).send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            _ => read_json(response).await.map(Some),
        }
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// GoTrue answers sign-up with a session when confirmation is disabled and
/// with the bare user object otherwise.
fn parse_sign_up(body: Value) -> Result<SignUpOutcome, ServiceError> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string);
    let user_value = match body.get("user") {
        Some(user @ Value::Object(_)) => user.clone(),
        _ => body,
    };
    let user: IdentityUser =
        serde_json::from_value(user_value).map_err(|_| ServiceError::Rejected("Registration failed".to_string()))?;
    Ok(SignUpOutcome { user, access_token })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Api { status: status.as_u16(), message: error_message(&body) });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

/// Like `read_json`, but client errors become `Rejected` so their message
/// (bad credentials, existing account) reaches the caller.
async fn read_auth_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Rejected(error_message(&body)));
    }
    read_json(response).await
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_with_session() {
        let outcome = parse_sign_up(json!({
            "access_token": "tok",
            "token_type": "bearer",
            "user": { "id": "u-1", "email": "a@example.com" }
        }))
        .unwrap();
        assert_eq!(outcome.access_token.as_deref(), Some("tok"));
        assert_eq!(outcome.user.id, "u-1");
    }

    #[test]
    fn test_sign_up_pending_confirmation() {
        let outcome = parse_sign_up(json!({
            "id": "u-2",
            "email": "b@example.com",
            "confirmation_sent_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert!(outcome.access_token.is_none());
        assert_eq!(outcome.user.email.as_deref(), Some("b@example.com"));
    }

    #[test]
    fn test_error_message_prefers_descriptive_fields() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(r#"{"code":"23505","message":"duplicate key"}"#), "duplicate key");
        assert_eq!(error_message("  gateway timeout \n"), "gateway timeout");
    }

    #[test]
    fn test_requires_configuration() {
        let err = SupabaseClient::new(&SupabaseConfig::default(), 5).unwrap_err();
        assert!(matches!(err, ServiceError::NotConfigured("Supabase")));
    }

    #[test]
    fn test_rejects_malformed_url() {
        let config = SupabaseConfig { url: "not a url".into(), service_key: "key".into() };
        let err = SupabaseClient::new(&config, 5).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));

        let config = SupabaseConfig { url: "https://abc.supabase.co/".into(), service_key: "key".into() };
        assert!(SupabaseClient::new(&config, 5).is_ok());
    }

    #[tokio::test]
    async fn test_non_uuid_user_ids_skip_the_database() {
        // Nothing listens on port 9; any request would fail
        let config = SupabaseConfig { url: "http://127.0.0.1:9".into(), service_key: "key".into() };
        let client = SupabaseClient::new(&config, 1).unwrap();

        assert!(client.get_user_by_id("u-1").await.unwrap().is_none());
        assert!(!client.update_user_chart_count("u-1", 2).await.unwrap());
        assert!(!client.update_user_subscription("u-1", SubscriptionTier::Pro).await.unwrap());
        let update = ProfileUpdateRequest { first_name: Some("Ada".into()), last_name: None };
        assert!(!client.update_user_profile("u-1", &update).await.unwrap());
        assert!(client.get_chart_by_id("chart-1").await.unwrap().is_none());
    }
}
