// services/payments/paytr.rs - PayTR iFrame tokens and callback hashes

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::Mac;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use super::{hmac_sha256, HmacSha256, PaymentError};
use crate::config::PayTrConfig;

const TOKEN_URL: &str = "https://www.paytr.com/odeme/api/get-token";
const IFRAME_URL: &str = "https://www.paytr.com/odeme/guvenli";
const ORDER_PREFIX: &str = "graphzy-";
const BASKET_ITEM: &str = "Graphzy Pro Subscription";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct PayTrSession {
    pub order_id: String,
    pub token: String,
    pub redirect_url: String,
}

/// Buyer and order details for an iFrame token request.
#[derive(Debug, Clone)]
pub struct PayTrOrder<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub user_ip: &'a str,
    pub amount: f64,
    pub success_url: &'a str,
    pub fail_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    status: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PayTrClient {
    client: reqwest::Client,
    config: PayTrConfig,
}

impl PayTrClient {
    pub fn new(client: reqwest::Client, config: PayTrConfig) -> Self {
        Self { client, config }
    }

    /// Merchant key and salt, the minimum needed to check callbacks.
    pub fn callback_keys(&self) -> Result<(&str, &str), PaymentError> {
        match (self.config.merchant_key.as_deref(), self.config.merchant_salt.as_deref()) {
            (Some(key), Some(salt)) => Ok((key, salt)),
            _ => Err(PaymentError::NotConfigured("PayTR is not configured".to_string())),
        }
    }

    fn merchant(&self) -> Result<(&str, &str, &str), PaymentError> {
        match (
            self.config.merchant_id.as_deref(),
            self.config.merchant_key.as_deref(),
            self.config.merchant_salt.as_deref(),
        ) {
            (Some(id), Some(key), Some(salt)) => Ok((id, key, salt)),
            _ => Err(PaymentError::NotConfigured(
                "PayTR is not configured. Please set PAYTR_MERCHANT_ID, PAYTR_MERCHANT_KEY, and PAYTR_MERCHANT_SALT environment variables."
                    .to_string(),
            )),
        }
    }

    /// Requests an iFrame token for a Pro subscription purchase.
    pub async fn create_session(&self, order: PayTrOrder<'_>) -> Result<PayTrSession, PaymentError> {
        let (merchant_id, merchant_key, merchant_salt) = self.merchant()?;

        let order_id = new_order_id(order.user_id);
        let payment_amount = amount_in_kurus(order.amount).to_string();
        let basket = user_basket(order.amount);
        let test_mode = if self.config.is_test() { "1" } else { "0" };
        let no_installment = "0";
        let max_installment = "0";
        let currency = "TL";

        let hash_input = [
            merchant_id,
            order.user_ip,
            order_id.as_str(),
            order.email,
            payment_amount.as_str(),
            basket.as_str(),
            no_installment,
            max_installment,
            currency,
            test_mode,
        ]
        .concat();
        let paytr_token = payment_token(merchant_key, merchant_salt, &hash_input)?;

        let form = [
            ("merchant_id", merchant_id),
            ("user_ip", order.user_ip),
            ("merchant_oid", order_id.as_str()),
            ("email", order.email),
            ("payment_amount", payment_amount.as_str()),
            ("paytr_token", paytr_token.as_str()),
            ("user_basket", basket.as_str()),
            ("no_installment", no_installment),
            ("max_installment", max_installment),
            ("currency", currency),
            ("test_mode", test_mode),
            ("lang", "tr"),
            ("merchant_ok_url", order.success_url),
            ("merchant_fail_url", order.fail_url),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await?;
        let result: TokenResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        match (result.status.as_str(), result.token) {
            ("success", Some(token)) => Ok(PayTrSession {
                redirect_url: format!("{}/{}", IFRAME_URL, token),
                order_id,
                token,
            }),
            (status, _) => Err(PaymentError::Provider {
                provider: "PayTR",
                message: format!(
                    "{} (Status: {})",
                    result.reason.as_deref().unwrap_or("Unknown error"),
                    status
                ),
            }),
        }
    }
}

/// `graphzy-{user_id}-{8 hex chars}`
pub fn new_order_id(user_id: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}-{}", ORDER_PREFIX, user_id, &suffix[..8])
}

/// Recovers the user id from an order id built by `new_order_id`. User ids
/// may themselves contain hyphens, so only the outer segments are removed.
pub fn user_id_from_order_id(order_id: &str) -> Option<&str> {
    let rest = order_id.strip_prefix(ORDER_PREFIX)?;
    let (user_id, _suffix) = rest.rsplit_once('-')?;
    if user_id.is_empty() {
        None
    } else {
        Some(user_id)
    }
}

/// PayTR expects amounts in kuruş.
pub fn amount_in_kurus(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn user_basket(amount: f64) -> String {
    let basket = json!([[BASKET_ITEM, format!("{:.2}", amount), 1]]);
    BASE64.encode(basket.to_string())
}

/// base64(HMAC-SHA256(key, hash_input + salt))
pub fn payment_token(merchant_key: &str, merchant_salt: &str, hash_input: &str) -> Result<String, PaymentError> {
    let message = format!("{}{}", hash_input, merchant_salt);
    Ok(BASE64.encode(hmac_sha256(merchant_key.as_bytes(), message.as_bytes())?))
}

/// base64(HMAC-SHA256(key, merchant_oid + salt + status + total_amount))
pub fn callback_hash(
    merchant_key: &str,
    merchant_salt: &str,
    merchant_oid: &str,
    status: &str,
    total_amount: &str,
) -> Result<String, PaymentError> {
    let message = format!("{}{}{}{}", merchant_oid, merchant_salt, status, total_amount);
    Ok(BASE64.encode(hmac_sha256(merchant_key.as_bytes(), message.as_bytes())?))
}

pub fn verify_callback_hash(
    merchant_key: &str,
    merchant_salt: &str,
    merchant_oid: &str,
    status: &str,
    total_amount: &str,
    received: &str,
) -> Result<(), PaymentError> {
    let invalid = || PaymentError::InvalidSignature("Invalid hash - possible security issue".to_string());
    let received = BASE64.decode(received.trim()).map_err(|_| invalid())?;

    let mut mac = HmacSha256::new_from_slice(merchant_key.as_bytes())
        .map_err(|_| PaymentError::InvalidSignature("Invalid signing key".to_string()))?;
    mac.update(format!("{}{}{}{}", merchant_oid, merchant_salt, status, total_amount).as_bytes());
    mac.verify_slice(&received).map_err(|_| invalid())
}
