use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Simulation endpoints
        .route("/api/simulation/run", post(handlers::run_simulation))
        .route("/api/simulation/status", get(handlers::get_status))
        .route("/api/simulation/results", get(handlers::get_results))
        .route("/api/simulation/summary", get(handlers::get_summary))
        .route("/api/simulation/reset", post(handlers::reset_simulation))
        // Agent endpoints
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/:name", get(handlers::get_agent))
        .route(
            "/api/agents/technical/:ticker",
            get(handlers::get_technical_analysis),
        )
        .route(
            "/api/agents/sentiment/:ticker",
            get(handlers::get_sentiment_analysis),
        )
        .route("/api/agents/debate", post(handlers::run_debate))
        // System endpoints
        .route("/health", get(handlers::health_handler))
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
