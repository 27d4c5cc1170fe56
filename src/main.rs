use anyhow::Context;
use tracing_subscriber::EnvFilter;

use graphzy_api::config::{config, DEFAULT_JWT_SECRET};
use graphzy_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, OPENAI_API_KEY, etc.
    let _ = dotenvy::dotenv();

    let config = config();
    init_tracing(config.server.debug);
    tracing::info!("Starting Graphzy API v{} in {:?} mode", env!("CARGO_PKG_VERSION"), config.environment);

    if is_production!() && config.security.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!("JWT_SECRET is the built-in default; set a real secret for production");
    }

    let state = AppState::from_config(config.clone()).context("failed to initialise services")?;
    let app = app(state);

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Graphzy API listening on http://{} (docs at /docs)", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Graphzy API shut down");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "graphzy_api=debug,tower_http=debug" } else { "graphzy_api=info,tower_http=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
