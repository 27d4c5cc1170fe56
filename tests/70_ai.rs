mod common;

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{TestApp, FAIL_PROMPT};

#[tokio::test]
async fn analyze_prompt_flattens_analysis() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app.post_json("/ai/analyze-prompt", None, &json!({"prompt": "quarterly revenue"})).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["labels"], json!(["Q1", "Q2"]));
    assert_eq!(body["values"], json!([10.0, 20.0]));
    assert_eq!(body["title"], "quarterly revenue");
    assert_eq!(body["suggested_charts"], json!([]));
    Ok(())
}

#[tokio::test]
async fn analyze_prompt_failure_is_reported() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.register("ada@example.com").await?;
    let res = app.post_json("/ai/analyze-prompt", Some(&user.token), &json!({"prompt": FAIL_PROMPT})).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap().starts_with("AI analysis failed:"));
    Ok(())
}

#[tokio::test]
async fn transcribe_audio_decodes_base64() -> Result<()> {
    let app = TestApp::spawn().await?;
    let audio = BASE64.encode([0u8, 1, 2, 3, 4]);
    let res = app
        .post_json("/ai/transcribe-audio", None, &json!({"audio_base64": audio, "mime_type": "audio/webm"}))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["text"], "5 bytes of audio/webm");

    let res = app.post_json("/ai/transcribe-audio", None, &json!({"audio_base64": "***not base64***"})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn generate_data_uses_defaults() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body: Value = app
        .post_json("/ai/generate-data", None, &json!({"description": "weekly signups"}))
        .await?
        .json()
        .await?;
    assert_eq!(body["labels"].as_array().unwrap().len(), 6);
    assert_eq!(body["values"].as_array().unwrap().len(), 6);
    assert_eq!(body["title"], "weekly signups");
    assert_eq!(body["suggested_type"], "bar");

    let body: Value = app
        .post_json("/ai/generate-data", None, &json!({"description": "trend", "data_points": 3, "chart_type": "line"}))
        .await?
        .json()
        .await?;
    assert_eq!(body["labels"], json!(["P1", "P2", "P3"]));
    assert_eq!(body["suggested_type"], "line");

    let res = app.post_json("/ai/generate-data", None, &json!({"description": FAIL_PROMPT})).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap().starts_with("Data generation failed:"));
    Ok(())
}
