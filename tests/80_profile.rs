mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

async fn put_profile(app: &TestApp, token: Option<&str>, body: &Value) -> Result<reqwest::Response> {
    let mut req = app.client.put(app.url("/profile/update")).json(body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    Ok(req.send().await?)
}

#[tokio::test]
async fn update_returns_refreshed_names() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;

    let res = put_profile(&app, Some(&user.token), &json!({"first_name": "Ada", "last_name": "Lovelace"})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"success": true, "first_name": "Ada", "last_name": "Lovelace"}));

    // Partial updates keep the other field
    let body: Value = put_profile(&app, Some(&user.token), &json!({"first_name": "Augusta"})).await?.json().await?;
    assert_eq!(body["first_name"], "Augusta");
    assert_eq!(body["last_name"], "Lovelace");

    let me: Value = app.get("/auth/me", Some(&user.token)).await?.json().await?;
    assert_eq!(me["first_name"], "Augusta");
    Ok(())
}

#[tokio::test]
async fn empty_update_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    let res = put_profile(&app, Some(&user.token), &json!({})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_requires_auth() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = put_profile(&app, None, &json!({"first_name": "Ada"})).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
