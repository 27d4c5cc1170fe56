// handlers/subscription.rs - /subscription handlers (Stripe checkout, webhook, IAP)

use axum::{body::Bytes, extract::State, http::HeaderMap, Extension, Json};
use chrono::Utc;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::schemas::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, SubscriptionTier, VerifyIapRequest, VerifyIapResponse,
    WebhookAck,
};
use crate::services::payments::stripe::{completed_checkout_user, verify_webhook_signature};
use crate::state::AppState;

const MIN_RECEIPT_LEN: usize = 10;

/// POST /subscription/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<CreateCheckoutSessionRequest>,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let session = state
        .payments
        .stripe
        .create_checkout_session(&user.email, &user.id, &request.success_url, &request.cancel_url)
        .await?;

    tracing::info!("Created Stripe checkout session {} for user {}", session.id, user.id);
    Ok(Json(CheckoutSessionResponse { session_id: session.id, url: session.url }))
}

/// POST /subscription/webhook
///
/// Stripe events are verified against the raw body before being parsed.
pub async fn webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<WebhookAck>> {
    let secret = state.payments.stripe.webhook_secret()?;
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Missing Stripe-Signature header"))?;

    verify_webhook_signature(&body, signature, secret, Utc::now().timestamp())?;

    let event: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(format!("Invalid payload: {}", e)))?;
    tracing::info!("Stripe webhook: {}", event["type"].as_str().unwrap_or("unknown"));

    if let Some(user_id) = completed_checkout_user(&event) {
        match state.store.update_user_subscription(user_id, SubscriptionTier::Pro).await {
            Ok(true) => tracing::info!("Upgraded user {} to pro", user_id),
            Ok(false) => tracing::warn!("Checkout completed for unknown user {}", user_id),
            Err(e) => tracing::error!("Failed to upgrade user {}: {}", user_id, e),
        }
    }

    Ok(Json(WebhookAck::ok()))
}

/// POST /subscription/verify-iap
///
/// Only the receipt shape is checked; store receipts are not validated with Apple or Google.
pub async fn verify_iap(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<VerifyIapRequest>,
) -> ApiResult<Json<VerifyIapResponse>> {
    if request.receipt.trim().len() < MIN_RECEIPT_LEN {
        return Err(ApiError::bad_request("Invalid receipt data"));
    }

    let updated = state
        .store
        .update_user_subscription(&user.id, SubscriptionTier::Pro)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("IAP verification failed: {}", e)))?;
    if !updated {
        tracing::warn!("IAP upgrade for {} did not match a users row", user.id);
    }
    tracing::info!("Verified {:?} purchase for user {}", request.platform, user.id);

    Ok(Json(VerifyIapResponse { success: true, user_id: user.id, subscription_tier: SubscriptionTier::Pro }))
}
