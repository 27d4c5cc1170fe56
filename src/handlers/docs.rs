// handlers/docs.rs - GET /docs, /redoc and /openapi.json

use axum::response::Html;
use axum::Json;
use serde_json::{json, Map, Value};

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Graphzy API - Swagger UI</title>
  <meta charset="utf-8"/>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>"##;

const REDOC: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Graphzy API - ReDoc</title>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
  <redoc spec-url="/openapi.json"></redoc>
  <script src="https://cdn.jsdelivr.net/npm/redoc@next/bundles/redoc.standalone.js"></script>
</body>
</html>"#;

/// Auth requirement of a documented operation.
#[derive(Clone, Copy, PartialEq)]
enum Access {
    Public,
    Optional,
    Bearer,
}

/// (method, path, tag, summary, access)
const OPERATIONS: &[(&str, &str, &str, &str, Access)] = &[
    ("get", "/", "system", "Service information", Access::Public),
    ("get", "/health", "system", "Health check", Access::Public),
    ("post", "/auth/login", "auth", "Log in with email and password", Access::Public),
    ("post", "/auth/register", "auth", "Register a new account", Access::Public),
    ("get", "/auth/me", "auth", "Current user", Access::Bearer),
    ("post", "/chart/generate", "charts", "Generate a chart from template data", Access::Bearer),
    ("get", "/chart/user/{user_id}", "charts", "List a user's charts", Access::Bearer),
    ("get", "/chart/{chart_id}", "charts", "Get a chart", Access::Bearer),
    ("delete", "/chart/{chart_id}", "charts", "Delete a chart", Access::Bearer),
    ("get", "/templates", "templates", "List all templates", Access::Optional),
    ("get", "/templates/public", "templates", "List free templates", Access::Optional),
    ("get", "/templates/{template_id}", "templates", "Get a template", Access::Optional),
    ("post", "/subscription/create-checkout-session", "subscription", "Start a Stripe checkout", Access::Bearer),
    ("post", "/subscription/webhook", "subscription", "Stripe webhook", Access::Public),
    ("post", "/subscription/verify-iap", "subscription", "Verify an in-app purchase", Access::Bearer),
    ("post", "/payment/create-paypal-session", "payment", "Create a PayPal order", Access::Bearer),
    ("post", "/payment/capture-paypal-payment", "payment", "Capture a PayPal order", Access::Bearer),
    ("post", "/payment/webhook", "payment", "PayPal webhook", Access::Public),
    ("post", "/payment/create-paytr-session", "payment", "Create a PayTR iFrame session", Access::Bearer),
    ("post", "/payment/paytr-callback", "payment", "PayTR payment callback", Access::Public),
    ("post", "/ai/analyze-prompt", "ai", "Extract chart data from a prompt", Access::Optional),
    ("post", "/ai/transcribe-audio", "ai", "Transcribe base64 audio", Access::Optional),
    ("post", "/ai/generate-data", "ai", "Generate sample chart data", Access::Optional),
    ("put", "/profile/update", "profile", "Update first and last name", Access::Bearer),
];

/// OpenAPI 3 document describing every route.
pub fn openapi_spec() -> Value {
    let mut paths = Map::new();
    for (method, path, tag, summary, access) in OPERATIONS {
        let mut operation = json!({
            "tags": [tag],
            "summary": summary,
            "responses": {
                "200": {"description": "Successful response"},
                "default": {
                    "description": "Error",
                    "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Error"}}}
                }
            }
        });

        let parameters: Vec<Value> = path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .map(|name| json!({"name": name, "in": "path", "required": true, "schema": {"type": "string"}}))
            .collect();
        if !parameters.is_empty() {
            operation["parameters"] = Value::Array(parameters);
        }

        match access {
            Access::Bearer => operation["security"] = json!([{"bearerAuth": []}]),
            Access::Optional => operation["security"] = json!([{}, {"bearerAuth": []}]),
            Access::Public => {}
        }

        let entry = paths.entry(path.to_string()).or_insert_with(|| json!({}));
        entry[*method] = operation;
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Graphzy API",
            "description": "AI-powered chart generation API",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": paths,
        "components": {
            "securitySchemes": {
                "bearerAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"}
            },
            "schemas": {
                "Error": {
                    "type": "object",
                    "required": ["detail", "code"],
                    "properties": {
                        "detail": {"type": "string"},
                        "code": {"type": "string"}
                    }
                }
            }
        }
    })
}

/// GET /openapi.json
pub async fn openapi() -> Json<Value> {
    Json(openapi_spec())
}

/// GET /docs
pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

/// GET /redoc
pub async fn redoc() -> Html<&'static str> {
    Html(REDOC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_pages_are_complete_documents() {
        assert!(SWAGGER_UI.contains(r##"dom_id: "#swagger-ui""##));
        assert!(SWAGGER_UI.trim_end().ends_with("</html>"));
        assert!(REDOC.contains(r#"spec-url="/openapi.json""#));
        assert!(REDOC.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_spec_lists_every_operation() {
        let spec = openapi_spec();
        let count: usize = spec["paths"]
            .as_object()
            .unwrap()
            .values()
            .map(|item| item.as_object().unwrap().len())
            .sum();
        assert_eq!(count, OPERATIONS.len());
    }

    #[test]
    fn test_chart_routes_share_one_path_item() {
        let spec = openapi_spec();
        let item = &spec["paths"]["/chart/{chart_id}"];
        assert!(item["get"].is_object());
        assert!(item["delete"].is_object());
        assert_eq!(item["delete"]["parameters"][0]["name"], "chart_id");
        assert_eq!(item["delete"]["security"][0]["bearerAuth"], json!([]));
    }

    #[test]
    fn test_public_routes_have_no_security() {
        let spec = openapi_spec();
        assert!(spec["paths"]["/health"]["get"].get("security").is_none());
    }
}
