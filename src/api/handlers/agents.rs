//! Trader roster and one-off analyst/debate endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::handlers::error_response;
use crate::api::state::AppState;
use crate::api::types::{AgentResponse, AnalysisQuery, DebateRequest};
use crate::debate::DebateTranscript;
use crate::domain::AnalysisSnapshot;
use crate::error::BullbearError;
use crate::sim::TraderSummary;

type HandlerResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

/// Performance from the most recent completed job, if any
async fn latest_summaries(state: &AppState) -> Vec<TraderSummary> {
    let registry = state.registry.read().await;
    registry
        .list()
        .iter()
        .rev()
        .find_map(|job| job.result.as_ref())
        .map(|result| result.traders.clone())
        .unwrap_or_default()
}

/// GET /api/agents -- the configured roster with latest performance
pub async fn list_agents(State(state): State<AppState>) -> HandlerResult<Vec<AgentResponse>> {
    let summaries = latest_summaries(&state).await;
    let agents = state
        .config
        .trading
        .traders
        .iter()
        .map(|spec| AgentResponse {
            name: spec.name.clone(),
            model: spec.model.clone(),
            performance: summaries.iter().find(|s| s.name == spec.name).cloned(),
        })
        .collect();
    Ok(Json(agents))
}

/// GET /api/agents/:name -- one roster entry by name
pub async fn get_agent(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> HandlerResult<AgentResponse> {
    let spec = state
        .config
        .trading
        .traders
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| error_response(BullbearError::TraderNotFound(name.clone())))?;

    let summaries = latest_summaries(&state).await;
    Ok(Json(AgentResponse {
        name: spec.name.clone(),
        model: spec.model.clone(),
        performance: summaries.iter().find(|s| s.name == spec.name).cloned(),
    }))
}

/// GET /api/agents/technical/:ticker?date= -- run the technical analyst once
pub async fn get_technical_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> HandlerResult<AnalysisSnapshot> {
    let snapshot = state
        .runner
        .technical_analyst()
        .analyze(&ticker.to_uppercase(), query.date)
        .await
        .map_err(error_response)?;
    Ok(Json(snapshot))
}

/// GET /api/agents/sentiment/:ticker?date= -- run the sentiment analyst once
pub async fn get_sentiment_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> HandlerResult<AnalysisSnapshot> {
    let snapshot = state
        .runner
        .sentiment_analyst()
        .analyze(&ticker.to_uppercase(), query.date)
        .await
        .map_err(error_response)?;
    Ok(Json(snapshot))
}

/// POST /api/agents/debate -- run a single debate outside any simulation
pub async fn run_debate(
    State(state): State<AppState>,
    Json(req): Json<DebateRequest>,
) -> HandlerResult<DebateTranscript> {
    let ticker = req
        .ticker
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| state.config.simulation.default_ticker.clone())
        .trim()
        .to_uppercase();
    let rounds = req.rounds.unwrap_or(state.config.simulation.debate_rounds);

    let technical = state
        .runner
        .technical_analyst()
        .analyze(&ticker, req.date)
        .await
        .map_err(error_response)?;
    let sentiment = state
        .runner
        .sentiment_analyst()
        .analyze(&ticker, req.date)
        .await
        .map_err(error_response)?;

    let transcript = state
        .runner
        .debate_engine()
        .conduct(&ticker, req.date, &technical, &sentiment, rounds)
        .await
        .map_err(error_response)?;
    Ok(Json(transcript))
}
