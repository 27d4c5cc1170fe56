mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::TestApp;

#[tokio::test]
async fn root_reports_service_info() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app.get("/", None).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["name"], "Graphzy API");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["docs"], "/docs");
    assert!(body["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body: Value = app.get("/health", None).await?.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn docs_pages_are_served() -> Result<()> {
    let app = TestApp::spawn().await?;

    let swagger = app.get("/docs", None).await?;
    assert_eq!(swagger.status(), StatusCode::OK);
    assert!(swagger.text().await?.contains("swagger-ui"));

    let redoc = app.get("/redoc", None).await?;
    assert_eq!(redoc.status(), StatusCode::OK);
    assert!(redoc.text().await?.contains("<redoc"));

    let spec: Value = app.get("/openapi.json", None).await?.json().await?;
    assert_eq!(spec["info"]["title"], "Graphzy API");
    assert!(spec["paths"]["/chart/generate"]["post"].is_object());
    Ok(())
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app
        .client
        .request(reqwest::Method::OPTIONS, app.url("/auth/login"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await?;

    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    Ok(())
}

#[tokio::test]
async fn cors_ignores_unknown_origin() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app
        .client
        .get(app.url("/health"))
        .header("Origin", "https://evil.example")
        .send()
        .await?;
    assert!(res.headers().get("access-control-allow-origin").is_none());
    Ok(())
}
