// services/payments/paypal.rs - PayPal Orders v2 client

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::PaymentError;
use crate::config::PayPalConfig;

const SANDBOX_API: &str = "https://api.sandbox.paypal.com";
const LIVE_API: &str = "https://api.paypal.com";

#[derive(Debug, Clone, PartialEq)]
pub struct PayPalOrder {
    pub order_id: String,
    pub approval_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct PayPalClient {
    client: reqwest::Client,
    config: PayPalConfig,
}

impl PayPalClient {
    pub fn new(client: reqwest::Client, config: PayPalConfig) -> Self {
        Self { client, config }
    }

    fn base_url(&self) -> &'static str {
        if self.config.is_live() {
            LIVE_API
        } else {
            SANDBOX_API
        }
    }

    fn credentials(&self) -> Result<(&str, &str), PaymentError> {
        match (self.config.client_id.as_deref(), self.config.secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(PaymentError::NotConfigured(
                "PayPal is not configured. Please set PAYPAL_CLIENT_ID and PAYPAL_SECRET environment variables."
                    .to_string(),
            )),
        }
    }

    async fn access_token(&self) -> Result<String, PaymentError> {
        let (client_id, secret) = self.credentials()?;
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.base_url()))
            .header("Accept", "application/json")
            .header("Accept-Language", "en_US")
            .basic_auth(client_id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                provider: "PayPal",
                message: format!("Failed to get PayPal access token: {}", body),
            });
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Creates a CAPTURE order and returns the buyer approval link.
    pub async fn create_order(
        &self,
        amount: f64,
        currency: &str,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<PayPalOrder, PaymentError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(format!("{}/v2/checkout/orders", self.base_url()))
            .bearer_auth(token)
            .json(&order_body(amount, currency, return_url, cancel_url))
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                provider: "PayPal",
                message: format!("Failed to create PayPal order: {}", body),
            });
        }
        let order: Value = response.json().await?;
        parse_order(&order)
    }

    /// Captures an approved order and returns PayPal's order status
    /// (`COMPLETED` on success).
    pub async fn capture_order(&self, order_id: &str) -> Result<String, PaymentError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(capture_url(self.base_url(), order_id)?)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                provider: "PayPal",
                message: format!("Failed to capture payment: {}", body),
            });
        }
        let capture: Value = response.json().await?;
        Ok(capture["status"].as_str().unwrap_or("UNKNOWN").to_string())
    }
}

fn order_body(amount: f64, currency: &str, return_url: &str, cancel_url: &str) -> Value {
    json!({
        "intent": "CAPTURE",
        "purchase_units": [{
            "amount": {
                "currency_code": currency,
                "value": format!("{:.2}", amount)
            },
            "description": "Graphzy Pro Subscription"
        }],
        "application_context": {
            "brand_name": "Graphzy",
            "landing_page": "BILLING",
            "user_action": "PAY_NOW",
            "return_url": return_url,
            "cancel_url": cancel_url
        }
    })
}

fn parse_order(order: &Value) -> Result<PayPalOrder, PaymentError> {
    let order_id = order["id"]
        .as_str()
        .ok_or_else(|| PaymentError::InvalidResponse("PayPal order id missing".to_string()))?;
    let approval_url = order["links"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|link| link["rel"] == "approve")
        .and_then(|link| link["href"].as_str())
        .ok_or_else(|| PaymentError::InvalidResponse("Failed to get PayPal approval URL".to_string()))?;

    Ok(PayPalOrder { order_id: order_id.to_string(), approval_url: approval_url.to_string() })
}

/// Order id referenced by a `PAYMENT.CAPTURE.COMPLETED` webhook event.
pub fn captured_order_id(event: &Value) -> Option<&str> {
    if event["event_type"].as_str() != Some("PAYMENT.CAPTURE.COMPLETED") {
        return None;
    }
    event["resource"]["supplementary_data"]["related_ids"]["order_id"].as_str()
}

/// Order ids are opaque alphanumeric tokens; anything else is refused rather
/// than spliced into the request path.
fn capture_url(base_url: &str, order_id: &str) -> Result<Url, PaymentError> {
    if order_id.is_empty() || !order_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(PaymentError::Provider { provider: "PayPal", message: "Invalid order id".to_string() });
    }

    let mut url = Url::parse(base_url).map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| PaymentError::InvalidResponse(format!("cannot build capture URL from {}", base_url)))?
        .extend(["v2", "checkout", "orders", order_id, "capture"]);
    Ok(url)
}
