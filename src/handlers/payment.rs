// handlers/payment.rs - /payment handlers for PayPal and PayTR

use axum::{extract::State, http::HeaderMap, Extension, Form, Json};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::schemas::{
    CapturePaymentRequest, CapturePaymentResponse, CreatePayTrRequest, CreatePaymentRequest, PayPalSessionResponse,
    PayTrCallbackForm, PayTrSessionResponse, PaymentCallbackResponse, SubscriptionTier, WebhookAck,
};
use crate::services::payments::paypal::captured_order_id;
use crate::services::payments::paytr::{user_id_from_order_id, verify_callback_hash, PayTrOrder, PayTrSession};
use crate::services::payments::PaymentError;
use crate::state::AppState;

/// POST /payment/create-paypal-session
pub async fn create_paypal_session(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<CreatePaymentRequest>,
) -> ApiResult<Json<PayPalSessionResponse>> {
    let order = state
        .payments
        .paypal
        .create_order(request.amount, &request.currency, &request.success_url, &request.cancel_url)
        .await?;

    tracing::info!("Created PayPal order {} for user {}", order.order_id, user.id);
    Ok(Json(PayPalSessionResponse { order_id: order.order_id, approval_url: order.approval_url }))
}

/// POST /payment/capture-paypal-payment
pub async fn capture_paypal_payment(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<CapturePaymentRequest>,
) -> ApiResult<Json<CapturePaymentResponse>> {
    let status = state.payments.paypal.capture_order(&request.order_id).await?;
    if status != "COMPLETED" {
        return Err(PaymentError::Declined(status).into());
    }

    state
        .store
        .update_user_subscription(&user.id, SubscriptionTier::Pro)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to update subscription: {}", e)))?;
    tracing::info!("Captured PayPal order {} for user {}", request.order_id, user.id);

    Ok(Json(CapturePaymentResponse { success: true, order_id: request.order_id, status: "completed".to_string() }))
}

/// POST /payment/webhook
pub async fn paypal_webhook(Json(event): Json<Value>) -> Json<WebhookAck> {
    let event_type = event["event_type"].as_str().unwrap_or("unknown");
    match captured_order_id(&event) {
        Some(order_id) => tracing::info!("PayPal webhook {}: order {}", event_type, order_id),
        None => tracing::info!("PayPal webhook {}", event_type),
    }
    Json(WebhookAck::ok())
}

/// POST /payment/create-paytr-session - Request a PayTR iFrame token
///
/// The buyer IP comes from the proxy headers. `iframe_url` carries the raw
/// token for embedding and `redirect_url` the hosted payment page.
pub async fn create_paytr_session(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    headers: HeaderMap,
    Json(request): Json<CreatePayTrRequest>,
) -> ApiResult<Json<PayTrSessionResponse>> {
    let user_ip = client_ip(&headers);
    let session = state
        .payments
        .paytr
        .create_session(PayTrOrder {
            user_id: &user.id,
            email: &user.email,
            user_ip: &user_ip,
            amount: request.amount,
            success_url: &request.success_url,
            fail_url: &request.fail_url,
        })
        .await?;

    tracing::info!("Created PayTR order {} for user {}", session.order_id, user.id);
    Ok(Json(paytr_session_response(session)))
}

/// The hosted page URL is for redirects; iFrame integrations embed the raw token.
fn paytr_session_response(session: PayTrSession) -> PayTrSessionResponse {
    PayTrSessionResponse {
        success: true,
        order_id: session.order_id,
        iframe_url: session.token,
        redirect_url: session.redirect_url,
    }
}

/// POST /payment/paytr-callback
///
/// PayTR posts the payment outcome as a form; the hash proves it came from PayTR.
pub async fn paytr_callback(
    State(state): State<AppState>,
    Form(form): Form<PayTrCallbackForm>,
) -> ApiResult<Json<PaymentCallbackResponse>> {
    let (merchant_key, merchant_salt) = state.payments.paytr.callback_keys()?;

    let (Some(merchant_oid), Some(status), Some(total_amount), Some(hash)) =
        (form.merchant_oid, form.status, form.total_amount, form.hash)
    else {
        return Err(ApiError::bad_request("Missing required callback fields"));
    };

    verify_callback_hash(merchant_key, merchant_salt, &merchant_oid, &status, &total_amount, &hash)?;

    if status != "success" {
        tracing::info!("PayTR payment {} failed with status {}", merchant_oid, status);
        return Ok(Json(PaymentCallbackResponse {
            status: "failed".to_string(),
            message: "Payment failed".to_string(),
        }));
    }

    let user_id = user_id_from_order_id(&merchant_oid)
        .ok_or_else(|| ApiError::bad_request("Could not extract user_id from order_id"))?;

    state
        .store
        .update_user_subscription(user_id, SubscriptionTier::Pro)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to update subscription: {}", e)))?;
    tracing::info!("PayTR payment {} completed; user {} upgraded", merchant_oid, user_id);

    Ok(Json(PaymentCallbackResponse {
        status: "success".to_string(),
        message: "Payment successful and subscription updated".to_string(),
    }))
}

/// Caller address as seen through a reverse proxy.
fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    let real_ip = headers.get("x-real-ip").and_then(|v| v.to_str().ok()).map(str::trim);

    forwarded.or(real_ip).unwrap_or("127.0.0.1").to_string()
}
