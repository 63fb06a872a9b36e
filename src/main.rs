use cliente_consolidado::config::Config;
use cliente_consolidado::handlers::AppState;
use cliente_consolidado::keep_alive::KeepAlive;
use cliente_consolidado::router::build_router;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing and configuration, starts the keep-alive pinger and
/// serves the HTTP routes until the process is stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cliente_consolidado=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Self-ping runs on its own task, independent of request handling
    let keep_alive = KeepAlive::from_config(&config)?;
    let _keep_alive_task = keep_alive.start();

    let port = config.port;
    let app_state = Arc::new(AppState::new(config)?);
    tracing::info!("Upstream client initialized: {}", app_state.config.api_base_url);

    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
