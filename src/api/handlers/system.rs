//! System endpoints.

use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::types::HealthResponse;

/// GET /health -- lightweight liveness probe
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.registry.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_seconds(),
        jobs: registry.list().len(),
        simulation_running: registry.is_running(),
    })
}
