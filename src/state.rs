use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::payments::PaymentClients;
use crate::services::{
    http_client, ChartAi, IdentityProvider, LocalIdentity, MemoryStore, OpenAiClient, Store, SupabaseClient,
};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub ai: Arc<dyn ChartAi>,
    pub payments: Arc<PaymentClients>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        ai: Arc<dyn ChartAi>,
    ) -> anyhow::Result<Self> {
        let client = http_client(config.openai.request_timeout_secs)?;
        let payments = PaymentClients::new(client, &config);

        Ok(Self { config: Arc::new(config), store, identity, ai, payments: Arc::new(payments) })
    }

    /// Wires the production backends. Without Supabase settings the service
    /// runs against the in-memory store and a local identity provider.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let ai: Arc<dyn ChartAi> = Arc::new(OpenAiClient::new(&config.openai)?);
        if config.openai.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set; AI endpoints will fail");
        }

        let (store, identity): (Arc<dyn Store>, Arc<dyn IdentityProvider>) = if config.supabase.is_configured() {
            let supabase = Arc::new(SupabaseClient::new(&config.supabase, config.openai.request_timeout_secs)?);
            tracing::info!("Using Supabase at {}", config.supabase.url);
            let store: Arc<dyn Store> = supabase.clone();
            let identity: Arc<dyn IdentityProvider> = supabase;
            (store, identity)
        } else {
            tracing::warn!("SUPABASE_URL/SUPABASE_SERVICE_KEY not set; using in-memory store and local accounts");
            let store: Arc<dyn Store> = Arc::new(MemoryStore::with_catalog());
            let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentity::new(config.security.clone()));
            (store, identity)
        };

        Self::new(config, store, identity, ai)
    }
}
