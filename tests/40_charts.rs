mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{TestApp, FAIL_PROMPT, FREE_CHART_LIMIT};
use graphzy_api::schemas::NewTemplate;
use graphzy_api::services::Store;

fn generate_body(template_id: &str) -> Value {
    json!({
        "template_id": template_id,
        "data": {"labels": ["Jan", "Feb"], "values": [1, 2], "title": "Revenue"}
    })
}

#[tokio::test]
async fn generate_persists_chart_and_counts_it() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    let template_id = app.template_id("Aurora Growth").await?;

    let res = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let chart: Value = res.json().await?;
    // The template's own type reaches the generator
    assert_eq!(chart["chart_config"]["type"], "area");
    assert_eq!(chart["jsx"], "<Chart type=\"area\" />");
    assert!(chart["created_at"].is_string());

    let me: Value = app.get("/auth/me", Some(&user.token)).await?.json().await?;
    assert_eq!(me["chart_count"], 1);

    let stored: Value = app.get(&format!("/chart/{}", chart["id"].as_str().unwrap()), Some(&user.token)).await?.json().await?;
    assert_eq!(stored["template_id"], template_id.as_str());
    assert_eq!(stored["input_data"]["title"], "Revenue");
    assert_eq!(stored["result_code"], "<Chart type=\"area\" />");
    let visual: Value = serde_json::from_str(stored["result_visual"].as_str().unwrap())?;
    assert_eq!(visual["type"], "area");
    Ok(())
}

#[tokio::test]
async fn explicit_chart_type_wins() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    let template_id = app.template_id("Midnight Velocity").await?;

    let mut body = generate_body(&template_id);
    body["chart_type"] = json!("radar");
    let chart: Value = app.post_json("/chart/generate", Some(&user.token), &body).await?.json().await?;
    assert_eq!(chart["chart_config"]["type"], "radar");
    Ok(())
}

#[tokio::test]
async fn free_quota_is_enforced() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    let template_id = app.template_id("Horizon Split").await?;
    app.store.update_user_chart_count(&user.id, FREE_CHART_LIMIT).await?;

    let res = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(
        body["detail"],
        format!("Free users can only generate {} charts. Upgrade to Pro for unlimited charts.", FREE_CHART_LIMIT)
    );

    // Pro users are not limited
    app.make_pro(&user).await?;
    let res = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn premium_template_requires_pro() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    app.store
        .upsert_templates(&[NewTemplate {
            name: "Zenith Funnel".into(),
            description: None,
            chart_type: "funnel".into(),
            is_premium: true,
            example_data: None,
            thumbnail_url: None,
        }])
        .await?;
    let template_id = app.template_id("Zenith Funnel").await?;

    let res = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "This template requires a Pro subscription");

    app.make_pro(&user).await?;
    let res = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn template_chart_type_is_passed_through_unchanged() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    app.make_pro(&user).await?;
    app.store
        .upsert_templates(&[NewTemplate {
            name: "Summit Surface".into(),
            description: None,
            chart_type: "3d-surface".into(),
            is_premium: true,
            example_data: None,
            thumbnail_url: None,
        }])
        .await?;
    let template_id = app.template_id("Summit Surface").await?;

    let chart: Value = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?.json().await?;
    assert_eq!(chart["chart_config"]["type"], "3d-surface");
    Ok(())
}

#[tokio::test]
async fn generate_errors() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;

    let res = app.post_json("/chart/generate", None, &generate_body("anything")).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.post_json("/chart/generate", Some(&user.token), &generate_body("missing")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Template not found");

    let template_id = app.template_id("Aurora Growth").await?;
    let body = json!({"template_id": template_id, "data": {FAIL_PROMPT: true}});
    let res = app.post_json("/chart/generate", Some(&user.token), &body).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap().starts_with("Chart generation failed:"));

    // Failed generations are not counted
    let me: Value = app.get("/auth/me", Some(&user.token)).await?.json().await?;
    assert_eq!(me["chart_count"], 0);
    Ok(())
}

#[tokio::test]
async fn charts_are_private_to_their_owner() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.register("owner@example.com").await?;
    let other = app.register("other@example.com").await?;
    let template_id = app.template_id("Aurora Growth").await?;

    let chart: Value = app.post_json("/chart/generate", Some(&owner.token), &generate_body(&template_id)).await?.json().await?;
    let chart_path = format!("/chart/{}", chart["id"].as_str().unwrap());

    let res = app.get(&chart_path, Some(&other.token)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.get(&format!("/chart/user/{}", owner.id), Some(&other.token)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "You can only view your own charts");

    let res = app.client.delete(app.url(&chart_path)).bearer_auth(&other.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "You can only delete your own charts");
    Ok(())
}

#[tokio::test]
async fn list_returns_newest_first() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    app.make_pro(&user).await?;
    let template_id = app.template_id("Aurora Growth").await?;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let chart: Value = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?.json().await?;
        ids.push(chart["id"].as_str().unwrap().to_string());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let charts: Vec<Value> = app.get(&format!("/chart/user/{}", user.id), Some(&user.token)).await?.json().await?;
    let listed: Vec<&str> = charts.iter().map(|c| c["id"].as_str().unwrap()).collect();
    ids.reverse();
    assert_eq!(listed, ids);
    Ok(())
}

#[tokio::test]
async fn delete_removes_chart_and_decrements_count() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    let template_id = app.template_id("Aurora Growth").await?;

    let chart: Value = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?.json().await?;
    let chart_path = format!("/chart/{}", chart["id"].as_str().unwrap());

    let res = app.client.delete(app.url(&chart_path)).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"success": true, "message": "Chart deleted successfully"}));

    let me: Value = app.get("/auth/me", Some(&user.token)).await?.json().await?;
    assert_eq!(me["chart_count"], 0);

    let res = app.get(&chart_path, Some(&user.token)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = app.client.delete(app.url(&chart_path)).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_never_drives_count_negative() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    let template_id = app.template_id("Aurora Growth").await?;

    let chart: Value = app.post_json("/chart/generate", Some(&user.token), &generate_body(&template_id)).await?.json().await?;
    app.store.update_user_chart_count(&user.id, 0).await?;

    let res = app
        .client
        .delete(app.url(&format!("/chart/{}", chart["id"].as_str().unwrap())))
        .bearer_auth(&user.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let me: Value = app.get("/auth/me", Some(&user.token)).await?.json().await?;
    assert_eq!(me["chart_count"], 0);
    Ok(())
}
