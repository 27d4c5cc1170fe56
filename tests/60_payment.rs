mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{test_config, TestApp, PAYTR_MERCHANT_KEY, PAYTR_MERCHANT_SALT};
use graphzy_api::services::payments::paytr::{callback_hash, new_order_id};

fn callback_form(merchant_oid: &str, status: &str, total_amount: &str) -> Vec<(String, String)> {
    let hash = callback_hash(PAYTR_MERCHANT_KEY, PAYTR_MERCHANT_SALT, merchant_oid, status, total_amount).unwrap();
    vec![
        ("merchant_oid".to_string(), merchant_oid.to_string()),
        ("status".to_string(), status.to_string()),
        ("total_amount".to_string(), total_amount.to_string()),
        ("hash".to_string(), hash),
    ]
}

async fn post_callback(app: &TestApp, form: &[(String, String)]) -> Result<reqwest::Response> {
    Ok(app.client.post(app.url("/payment/paytr-callback")).form(form).send().await?)
}

async fn tier(app: &TestApp, token: &str) -> Result<String> {
    let me: Value = app.get("/auth/me", Some(token)).await?.json().await?;
    Ok(me["subscription_tier"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn successful_paytr_callback_upgrades_user() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;

    let form = callback_form(&new_order_id(&user.id), "success", "29900");
    let res = post_callback(&app, &form).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "success");

    assert_eq!(tier(&app, &user.token).await?, "pro");
    Ok(())
}

#[tokio::test]
async fn failed_paytr_payment_is_reported() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;

    let form = callback_form(&new_order_id(&user.id), "failed", "29900");
    let body: Value = post_callback(&app, &form).await?.json().await?;
    assert_eq!(body["status"], "failed");
    assert_eq!(tier(&app, &user.token).await?, "free");
    Ok(())
}

#[tokio::test]
async fn paytr_callback_rejects_tampering() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;

    let mut form = callback_form(&new_order_id(&user.id), "success", "29900");
    form[2].1 = "1".to_string();
    let res = post_callback(&app, &form).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Invalid hash - possible security issue");
    assert_eq!(tier(&app, &user.token).await?, "free");
    Ok(())
}

#[tokio::test]
async fn paytr_callback_validates_fields_and_order_id() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = post_callback(&app, &[("merchant_oid".to_string(), "graphzy-x-1234abcd".to_string())]).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_callback(&app, &callback_form("order-from-elsewhere", "success", "100")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Could not extract user_id from order_id");
    Ok(())
}

#[tokio::test]
async fn paytr_callback_without_keys_is_a_server_error() -> Result<()> {
    let mut config = test_config();
    config.paytr.merchant_key = None;
    let app = TestApp::spawn_with(config).await?;

    let res = post_callback(&app, &callback_form("graphzy-u-1234abcd", "success", "100")).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn unconfigured_providers_fail_before_any_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;

    let res = app
        .post_json(
            "/payment/create-paypal-session",
            Some(&user.token),
            &json!({"success_url": "https://a.example/ok", "cancel_url": "https://a.example/no", "amount": 9.99}),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap().starts_with("PayPal is not configured"));

    let res = app
        .post_json("/payment/capture-paypal-payment", Some(&user.token), &json!({"order_id": "ORDER-1"}))
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let res = app
        .post_json(
            "/payment/create-paytr-session",
            Some(&user.token),
            &json!({"success_url": "https://a.example/ok", "fail_url": "https://a.example/no", "amount": 299.0}),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap().starts_with("PayTR is not configured"));
    Ok(())
}

#[tokio::test]
async fn payment_sessions_require_auth() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app.post_json("/payment/capture-paypal-payment", None, &json!({"order_id": "ORDER-1"})).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn paypal_webhook_is_acknowledged() -> Result<()> {
    let app = TestApp::spawn().await?;
    let event = json!({
        "event_type": "PAYMENT.CAPTURE.COMPLETED",
        "resource": {"supplementary_data": {"related_ids": {"order_id": "ORDER-1"}}}
    });
    let res = app.post_json("/payment/webhook", None, &event).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}
