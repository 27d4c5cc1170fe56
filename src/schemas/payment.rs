use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub success_url: String,
    pub cancel_url: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalSessionResponse {
    pub order_id: String,
    pub approval_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturePaymentRequest {
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturePaymentResponse {
    pub success: bool,
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayTrRequest {
    pub success_url: String,
    pub fail_url: String,
    pub amount: f64,
    /// Informational; orders are always tied to the authenticated user.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayTrSessionResponse {
    pub success: bool,
    pub order_id: String,
    pub iframe_url: String,
    pub redirect_url: String,
}

/// Form fields PayTR posts to the callback URL. All optional so missing
/// fields can be reported with a 400 instead of a form rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayTrCallbackForm {
    pub merchant_oid: Option<String>,
    pub status: Option<String>,
    pub total_amount: Option<String>,
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCallbackResponse {
    pub status: String,
    pub message: String,
}
