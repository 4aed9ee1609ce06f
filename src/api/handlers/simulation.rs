//! Simulation job endpoints: run, status, results, summary, reset.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::api::handlers::error_response;
use crate::api::state::AppState;
use crate::api::types::*;
use crate::sim::{calendar, JobStatus, SimulationResult};

type HandlerResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

/// POST /api/simulation/run -- start a background simulation job
pub async fn run_simulation(
    State(state): State<AppState>,
    Json(req): Json<RunSimulationRequest>,
) -> HandlerResult<RunSimulationResponse> {
    let ticker = req
        .ticker
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| state.config.simulation.default_ticker.clone())
        .trim()
        .to_uppercase();

    let days = calendar::trading_days(req.start_date, req.end_date).map_err(error_response)?;

    let job_id = state
        .runner
        .spawn(ticker.clone(), req.start_date, req.end_date, req.debate_rounds)
        .await
        .map_err(error_response)?;

    info!(%job_id, ticker, "simulation accepted");
    Ok(Json(RunSimulationResponse {
        job_id,
        ticker,
        total_days: days.len(),
        message: "simulation started".to_string(),
    }))
}

/// GET /api/simulation/status -- progress of a job (most recent by default)
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> HandlerResult<JobStatusResponse> {
    let registry = state.registry.read().await;
    let job = registry.get(query.job_id).map_err(error_response)?;
    Ok(Json(JobStatusResponse::from(job)))
}

/// GET /api/simulation/results -- full day-by-day result of a completed job
pub async fn get_results(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> HandlerResult<SimulationResult> {
    let registry = state.registry.read().await;
    let job = registry.get(query.job_id).map_err(error_response)?;
    match (&job.result, job.status) {
        (Some(result), _) => Ok(Json(result.clone())),
        (None, JobStatus::Error) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            job.error
                .clone()
                .unwrap_or_else(|| "simulation failed".to_string()),
        )),
        (None, _) => Err((
            StatusCode::BAD_REQUEST,
            "simulation still in progress".to_string(),
        )),
    }
}

/// GET /api/simulation/summary -- per-trader outcomes of a completed job
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> HandlerResult<SummaryResponse> {
    let registry = state.registry.read().await;
    let job = registry.get(query.job_id).map_err(error_response)?;
    match &job.result {
        Some(result) => Ok(Json(SummaryResponse {
            job_id: job.id,
            ticker: result.ticker.clone(),
            total_days: result.total_days,
            traders: result.traders.clone(),
        })),
        None => Err((
            StatusCode::BAD_REQUEST,
            "simulation has no results yet".to_string(),
        )),
    }
}

/// POST /api/simulation/reset -- clear all job state
pub async fn reset_simulation(State(state): State<AppState>) -> HandlerResult<ResetResponse> {
    state
        .registry
        .write()
        .await
        .reset()
        .map_err(error_response)?;
    Ok(Json(ResetResponse {
        message: "simulation state cleared".to_string(),
    }))
}
