// services/payments/stripe.rs - Stripe checkout sessions and webhook signatures

use hmac::Mac;
use serde::Deserialize;
use serde_json::Value;

use super::{HmacSha256, PaymentError};
use crate::config::StripeConfig;

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// Maximum age of a webhook signature timestamp.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(client: reqwest::Client, config: StripeConfig) -> Self {
        Self { client, config }
    }

    pub fn webhook_secret(&self) -> Result<&str, PaymentError> {
        self.config
            .webhook_secret
            .as_deref()
            .ok_or_else(|| PaymentError::NotConfigured("Stripe webhook secret not configured".to_string()))
    }

    /// Creates a subscription checkout for the Pro price, tagged with the user id.
    pub async fn create_checkout_session(
        &self,
        customer_email: &str,
        user_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let secret_key = self.config.secret_key.as_deref().ok_or_else(|| {
            PaymentError::NotConfigured(
                "Stripe is not configured. Please set STRIPE_SECRET_KEY environment variable.".to_string(),
            )
        })?;
        let price_id = self
            .config
            .price_id
            .as_deref()
            .ok_or_else(|| PaymentError::NotConfigured("Stripe Price ID not configured".to_string()))?;

        let params = [
            ("mode", "subscription"),
            ("customer_email", customer_email),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("metadata[user_id]", user_id),
        ];

        let response = self
            .client
            .post(format!("{}/checkout/sessions", STRIPE_API))
            .basic_auth(secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("request failed").to_string();
            return Err(PaymentError::Provider { provider: "Stripe", message });
        }

        serde_json::from_value(body).map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }
}

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`) against
/// the raw request body.
pub fn verify_webhook_signature(payload: &[u8], header: &str, secret: &str, now: i64) -> Result<(), PaymentError> {
    let invalid = |reason: &str| PaymentError::InvalidSignature(format!("Invalid Stripe signature: {}", reason));

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for pair in header.split(',') {
        match pair.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| invalid("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(invalid("missing v1 signature"));
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(invalid("timestamp outside tolerance"));
    }

    let mut signed = timestamp.to_string().into_bytes();
    signed.push(b'.');
    signed.extend_from_slice(payload);

    let matches = signatures.iter().filter_map(|sig| hex::decode(sig).ok()).any(|expected| {
        HmacSha256::new_from_slice(secret.as_bytes())
            .map(|mut mac| {
                mac.update(&signed);
                mac.verify_slice(&expected).is_ok()
            })
            .unwrap_or(false)
    });

    if matches {
        Ok(())
    } else {
        Err(invalid("signature mismatch"))
    }
}

/// User id carried by a `checkout.session.completed` event, if any.
pub fn completed_checkout_user(event: &Value) -> Option<&str> {
    if event["type"].as_str() != Some("checkout.session.completed") {
        return None;
    }
    event["data"]["object"]["metadata"]["user_id"].as_str().filter(|id| !id.is_empty())
}

#[cfg(test)]
pub(crate) fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
