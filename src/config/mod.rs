use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub supabase: SupabaseConfig,
    pub openai: OpenAiConfig,
    pub charts: ChartConfig,
    pub stripe: StripeConfig,
    pub paypal: PayPalConfig,
    pub paytr: PayTrConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    /// bcrypt work factor for locally stored passwords.
    pub password_hash_cost: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub transcription_model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub free_chart_limit: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub price_id: Option<String>,
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalConfig {
    pub client_id: Option<String>,
    pub secret: Option<String>,
    /// `sandbox` or `live`
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayTrConfig {
    pub merchant_id: Option<String>,
    pub merchant_key: Option<String>,
    pub merchant_salt: Option<String>,
    /// `test` or `live`
    pub mode: String,
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.service_key.is_empty()
    }
}

impl PayPalConfig {
    pub fn is_live(&self) -> bool {
        self.mode == "live"
    }
}

impl PayTrConfig {
    pub fn is_test(&self) -> bool {
        self.mode != "live"
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::for_environment(environment).with_overrides(|key| env::var(key).ok())
    }

    /// Preset defaults for an environment, before any overrides are applied.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    /// Values that fail to parse leave the preset untouched.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = lookup("API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("DEBUG") {
            self.server.debug = parse_bool(&v).unwrap_or(self.server.debug);
        }
        if let Some(v) = lookup("MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Security
        if let Some(v) = non_empty(lookup("JWT_SECRET")) {
            self.security.jwt_secret = v;
        }
        if let Some(v) = non_empty(lookup("JWT_ALGORITHM")) {
            self.security.jwt_algorithm = v;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            self.security.password_hash_cost = v
                .parse()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .unwrap_or(self.security.password_hash_cost);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = split_origins(&v);
        }

        // Supabase
        if let Some(v) = lookup("SUPABASE_URL") {
            self.supabase.url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("SUPABASE_SERVICE_KEY") {
            self.supabase.service_key = v;
        }

        // OpenAI
        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = v;
        }
        if let Some(v) = non_empty(lookup("OPENAI_BASE_URL")) {
            self.openai.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty(lookup("OPENAI_MODEL")) {
            self.openai.model = v;
        }
        if let Some(v) = non_empty(lookup("OPENAI_TRANSCRIPTION_MODEL")) {
            self.openai.transcription_model = v;
        }
        if let Some(v) = lookup("OPENAI_TIMEOUT_SECS") {
            self.openai.request_timeout_secs = v.parse().unwrap_or(self.openai.request_timeout_secs);
        }

        // Charts
        if let Some(v) = lookup("FREE_CHART_LIMIT") {
            self.charts.free_chart_limit = v.parse().unwrap_or(self.charts.free_chart_limit);
        }

        // Stripe
        if let Some(v) = non_empty(lookup("STRIPE_SECRET_KEY")) {
            self.stripe.secret_key = Some(v);
        }
        if let Some(v) = non_empty(lookup("STRIPE_PRICE_ID")) {
            self.stripe.price_id = Some(v);
        }
        if let Some(v) = non_empty(lookup("STRIPE_WEBHOOK_SECRET")) {
            self.stripe.webhook_secret = Some(v);
        }

        // PayPal
        if let Some(v) = non_empty(lookup("PAYPAL_CLIENT_ID")) {
            self.paypal.client_id = Some(v);
        }
        if let Some(v) = non_empty(lookup("PAYPAL_SECRET")) {
            self.paypal.secret = Some(v);
        }
        if let Some(v) = non_empty(lookup("PAYPAL_MODE")) {
            self.paypal.mode = v.to_lowercase();
        }

        // PayTR
        if let Some(v) = non_empty(lookup("PAYTR_MERCHANT_ID")) {
            self.paytr.merchant_id = Some(v);
        }
        if let Some(v) = non_empty(lookup("PAYTR_MERCHANT_KEY")) {
            self.paytr.merchant_key = Some(v);
        }
        if let Some(v) = non_empty(lookup("PAYTR_MERCHANT_SALT")) {
            self.paytr.merchant_salt = Some(v);
        }
        if let Some(v) = non_empty(lookup("PAYTR_MODE")) {
            self.paytr.mode = v.to_lowercase();
        }

        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                debug: true,
                max_request_size_bytes: 25 * 1024 * 1024, // audio uploads
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_algorithm: "HS256".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:8081".to_string()],
                password_hash_cost: bcrypt::DEFAULT_COST,
            },
            supabase: SupabaseConfig::default(),
            openai: OpenAiConfig::default(),
            charts: ChartConfig { free_chart_limit: 5 },
            stripe: StripeConfig::default(),
            paypal: PayPalConfig::default(),
            paytr: PayTrConfig::default(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.debug = false;
        config.security.jwt_expiry_hours = 24;
        config
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                debug: false,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_algorithm: "HS256".to_string(),
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
                password_hash_cost: bcrypt::DEFAULT_COST,
            },
            supabase: SupabaseConfig::default(),
            openai: OpenAiConfig::default(),
            charts: ChartConfig { free_chart_limit: 5 },
            stripe: StripeConfig::default(),
            paypal: PayPalConfig { mode: "live".to_string(), ..PayPalConfig::default() },
            paytr: PayTrConfig { mode: "live".to_string(), ..PayTrConfig::default() },
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4-turbo-preview".to_string(),
            transcription_model: "whisper-1".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self { client_id: None, secret: None, mode: "sandbox".to_string() }
    }
}

impl Default for PayTrConfig {
    fn default() -> Self {
        Self { merchant_id: None, merchant_key: None, merchant_salt: None, mode: "test".to_string() }
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 8000);
        assert!(config.server.debug);
        assert_eq!(config.security.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.security.jwt_algorithm, "HS256");
        assert_eq!(config.charts.free_chart_limit, 5);
        assert_eq!(
            config.security.cors_origins,
            vec!["http://localhost:3000".to_string(), "http://localhost:8081".to_string()]
        );
        assert!(!config.supabase.is_configured());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.server.debug);
        assert!(config.security.cors_origins.is_empty());
        assert!(config.paypal.is_live());
        assert!(!config.paytr.is_test());
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let config = AppConfig::development()
            .with_overrides(lookup_from(&[("CORS_ORIGINS", " https://a.example , https://b.example ,")]));
        assert_eq!(
            config.security.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_unparseable_overrides_keep_defaults() {
        let config = AppConfig::development().with_overrides(lookup_from(&[
            ("API_PORT", "not-a-port"),
            ("DEBUG", "maybe"),
            ("FREE_CHART_LIMIT", "lots"),
            ("BCRYPT_COST", "99"),
        ]));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.security.password_hash_cost, bcrypt::DEFAULT_COST);
        assert!(config.server.debug);
        assert_eq!(config.charts.free_chart_limit, 5);
    }

    #[test]
    fn test_service_overrides() {
        let config = AppConfig::development().with_overrides(lookup_from(&[
            ("SUPABASE_URL", "https://project.supabase.co/"),
            ("SUPABASE_SERVICE_KEY", "service"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "9100"),
            ("DEBUG", "False"),
            ("STRIPE_SECRET_KEY", ""),
            ("PAYTR_MODE", "LIVE"),
            ("BCRYPT_COST", "4"),
        ]));
        assert_eq!(config.supabase.url, "https://project.supabase.co");
        assert!(config.supabase.is_configured());
        assert_eq!(config.security.jwt_secret, "s3cret");
        assert_eq!(config.server.port, 9100);
        assert!(!config.server.debug);
        assert!(config.stripe.secret_key.is_none());
        assert!(!config.paytr.is_test());
        assert_eq!(config.bind_address(), "0.0.0.0:9100");
        assert_eq!(config.security.password_hash_cost, 4);
    }
}
