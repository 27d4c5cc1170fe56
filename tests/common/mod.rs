#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

use graphzy_api::config::{AppConfig, Environment};
use graphzy_api::schemas::{GenerateDataResponse, PromptAnalysis, SubscriptionTier};
use graphzy_api::services::openai::GeneratedChart;
use graphzy_api::services::{AiError, ChartAi, LocalIdentity, MemoryStore, Store};
use graphzy_api::{app, AppState};

pub const STRIPE_WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const PAYTR_MERCHANT_KEY: &str = "paytr-test-key";
pub const PAYTR_MERCHANT_SALT: &str = "paytr-test-salt";
pub const FREE_CHART_LIMIT: i64 = 2;

/// Prompts containing this word make the stub AI fail.
pub const FAIL_PROMPT: &str = "explode";

/// Deterministic stand-in for the OpenAI client.
pub struct StubAi;

#[async_trait]
impl ChartAi for StubAi {
    async fn generate_chart(&self, chart_type: &str, data: &Map<String, Value>) -> Result<GeneratedChart, AiError> {
        if data.contains_key(FAIL_PROMPT) {
            return Err(AiError::EmptyResponse);
        }
        Ok(GeneratedChart {
            chart_config: json!({"type": chart_type, "data": {"labels": data.get("labels").cloned().unwrap_or(Value::Null)}}),
            jsx: format!("<Chart type=\"{}\" />", chart_type),
            description: format!("A {} chart", chart_type),
            svg: None,
        })
    }

    async fn analyze_prompt(&self, prompt: &str) -> Result<PromptAnalysis, AiError> {
        if prompt.contains(FAIL_PROMPT) {
            return Err(AiError::Parse("bad json".to_string()));
        }
        Ok(PromptAnalysis {
            labels: vec!["Q1".into(), "Q2".into()],
            values: vec![10.0, 20.0],
            title: Some(prompt.to_string()),
            ..PromptAnalysis::default()
        })
    }

    async fn generate_data(
        &self,
        description: &str,
        data_points: u32,
        chart_type: Option<&str>,
    ) -> Result<GenerateDataResponse, AiError> {
        if description.contains(FAIL_PROMPT) {
            return Err(AiError::EmptyResponse);
        }
        Ok(GenerateDataResponse {
            labels: (1..=data_points).map(|i| format!("P{}", i)).collect(),
            values: (1..=data_points).map(f64::from).collect(),
            title: description.to_string(),
            suggested_type: chart_type.unwrap_or("bar").to_string(),
        })
    }

    async fn transcribe_audio(&self, audio: Vec<u8>, mime_type: Option<&str>) -> Result<String, AiError> {
        Ok(format!("{} bytes of {}", audio.len(), mime_type.unwrap_or("audio/m4a")))
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_environment(Environment::Development);
    config.charts.free_chart_limit = FREE_CHART_LIMIT;
    // Lowest bcrypt cost keeps registration fast
    config.security.password_hash_cost = 4;
    config.stripe.webhook_secret = Some(STRIPE_WEBHOOK_SECRET.to_string());
    config.paytr.merchant_key = Some(PAYTR_MERCHANT_KEY.to_string());
    config.paytr.merchant_salt = Some(PAYTR_MERCHANT_SALT.to_string());
    config
}

/// A router served in-process on a free port.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

/// A registered account and its bearer token.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::with_catalog());
        let identity = Arc::new(LocalIdentity::new(config.security.clone()));
        let state = AppState::new(config.clone(), store.clone(), identity, Arc::new(StubAi))?;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let test_app = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            store,
            config,
        };
        test_app.wait_ready(Duration::from_secs(5)).await?;
        Ok(test_app)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str) -> Result<TestUser> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({"email": email, "password": "correct-horse"}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        Ok(TestUser {
            id: body["user_id"].as_str().context("user_id")?.to_string(),
            email: email.to_string(),
            token: body["access_token"].as_str().context("access_token")?.to_string(),
        })
    }

    pub async fn make_pro(&self, user: &TestUser) -> Result<()> {
        self.store.update_user_subscription(&user.id, SubscriptionTier::Pro).await?;
        Ok(())
    }

    pub async fn template_id(&self, name: &str) -> Result<String> {
        let templates = self.store.get_all_templates().await?;
        templates
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.id)
            .with_context(|| format!("template {} not seeded", name))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: &Value) -> Result<reqwest::Response> {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }
}
