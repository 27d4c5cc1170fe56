// app.rs - Router assembly: route groups, auth layers, CORS and tracing

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{self, system};
use crate::middleware::{jwt_auth_middleware, optional_auth_middleware};
use crate::state::AppState;

/// Build the full HTTP application.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(docs_routes())
        .merge(auth_public_routes())
        .merge(webhook_routes())
        // Optional auth
        .merge(template_routes(&state))
        .merge(ai_routes(&state))
        // Protected
        .merge(auth_routes(&state))
        .merge(chart_routes(&state))
        .merge(subscription_routes(&state))
        .merge(payment_routes(&state))
        .merge(profile_routes(&state))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow-listed origins with credentials; methods and headers are mirrored
/// from the preflight since wildcards are not allowed with credentials.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn docs_routes() -> Router<AppState> {
    use handlers::docs;

    Router::new()
        .route("/docs", get(docs::swagger_ui))
        .route("/redoc", get(docs::redoc))
        .route("/openapi.json", get(docs::openapi))
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
}

fn webhook_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::{payment, subscription};

    Router::new()
        // Provider callbacks are authenticated by signature, not JWT
        .route("/subscription/webhook", post(subscription::webhook))
        .route("/payment/webhook", post(payment::paypal_webhook))
        .route("/payment/paytr-callback", post(payment::paytr_callback))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn chart_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::post;
    use handlers::charts;

    Router::new()
        .route("/chart/generate", post(charts::generate))
        .route("/chart/user/:user_id", get(charts::list_for_user))
        .route("/chart/:chart_id", get(charts::get).delete(charts::delete))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn template_routes(state: &AppState) -> Router<AppState> {
    use handlers::templates;

    Router::new()
        .route("/templates", get(templates::list))
        .route("/templates/public", get(templates::list_public))
        .route("/templates/:template_id", get(templates::get))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
}

fn subscription_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::post;
    use handlers::subscription;

    Router::new()
        .route("/subscription/create-checkout-session", post(subscription::create_checkout_session))
        .route("/subscription/verify-iap", post(subscription::verify_iap))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn payment_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::post;
    use handlers::payment;

    Router::new()
        .route("/payment/create-paypal-session", post(payment::create_paypal_session))
        .route("/payment/capture-paypal-payment", post(payment::capture_paypal_payment))
        .route("/payment/create-paytr-session", post(payment::create_paytr_session))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn ai_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::post;
    use handlers::ai;

    Router::new()
        .route("/ai/analyze-prompt", post(ai::analyze_prompt))
        .route("/ai/transcribe-audio", post(ai::transcribe_audio))
        .route("/ai/generate-data", post(ai::generate_data))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
}

fn profile_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::put;
    use handlers::profile;

    Router::new()
        .route("/profile/update", put(profile::update))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}
