// handlers/system.rs - GET / and GET /health

use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Graphzy API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
        "docs": "/docs"
    }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
