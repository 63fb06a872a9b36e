use crate::config::Config;
use crate::errors::AppError;
use crate::health::{format_timestamp, HealthState};
use crate::models::{ConsolidatedRecord, HealthResponse, ServiceDescriptor};
use crate::services::ConsolidationService;
use crate::upstream_client::UpstreamClient;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

pub const SERVICE_NAME: &str = "Cliente Consolidado API";
pub const HEALTH_PATH: &str = "/health";
pub const CONSOLIDATED_PATH: &str = "/api/clientes/consolidado";

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the three data upstreams.
    pub upstream: UpstreamClient,
    /// Process-wide health counters.
    pub health: HealthState,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let upstream = UpstreamClient::from_config(&config)?;

        Ok(Self {
            config,
            upstream,
            health: HealthState::new(),
        })
    }
}

/// GET /health
///
/// Records the check and reports uptime plus the running check count.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let response = state.health.record_check().await;
    tracing::debug!("Health check #{}", response.checks_count);

    (StatusCode::OK, Json(response))
}

/// GET /
///
/// Static service metadata plus a read-only view of the health counters.
pub async fn index(State(state): State<Arc<AppState>>) -> Json<ServiceDescriptor> {
    Json(ServiceDescriptor {
        service: SERVICE_NAME.to_string(),
        status: "running".to_string(),
        current_time: format_timestamp(chrono::Utc::now()),
        health_info: state.health.snapshot().await,
        available_endpoints: vec![HEALTH_PATH.to_string(), CONSOLIDATED_PATH.to_string()],
    })
}

/// GET /api/clientes/consolidado
///
/// Joins segments, customers and purchase details into one list.
///
/// # Returns
///
/// * `Result<Json<Vec<ConsolidatedRecord>>, AppError>` - The consolidated list, or a 500
///   when a required upstream fails.
pub async fn get_consolidated_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConsolidatedRecord>>, AppError> {
    tracing::info!("GET {}", CONSOLIDATED_PATH);

    let consolidation = ConsolidationService::new(&state.upstream)
        .consolidate_customers()
        .await?;

    tracing::info!(
        "Returning {} consolidated records ({} skipped)",
        consolidation.stats.processed,
        consolidation.stats.skipped
    );

    Ok(Json(consolidation.records))
}
