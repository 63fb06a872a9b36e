use crate::handlers::{self, AppState, CONSOLIDATED_PATH, HEALTH_PATH};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the HTTP surface: `/`, `/health` and `/api/clientes/consolidado`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(HEALTH_PATH, get(handlers::health))
        .route(CONSOLIDATED_PATH, get(handlers::get_consolidated_customers))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
