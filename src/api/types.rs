//! Request and response shapes for the HTTP API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sim::{JobState, JobStatus, TraderSummary};

#[derive(Debug, Deserialize)]
pub struct RunSimulationRequest {
    /// Defaults to the configured ticker when omitted
    pub ticker: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Debate rounds per day; defaults to the configured value
    pub debate_rounds: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RunSimulationResponse {
    pub job_id: Uuid,
    pub ticker: String,
    pub total_days: usize,
    pub message: String,
}

/// Optional job addressing shared by the status/results/summary endpoints
#[derive(Debug, Deserialize)]
pub struct JobQuery {
    pub job_id: Option<Uuid>,
}

/// Job status view: everything in the job state except the result payload
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: JobStatus,
    pub progress: u8,
    pub current_date: Option<NaiveDate>,
    pub total_days: usize,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&JobState> for JobStatusResponse {
    fn from(job: &JobState) -> Self {
        Self {
            job_id: job.id,
            ticker: job.ticker.clone(),
            start_date: job.start_date,
            end_date: job.end_date,
            status: job.status,
            progress: job.progress,
            current_date: job.current_date,
            total_days: job.total_days,
            error: job.error.clone(),
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub job_id: Uuid,
    pub ticker: String,
    pub total_days: usize,
    pub traders: Vec<TraderSummary>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
}

/// Analysis date for the one-off analyst endpoints
#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DebateRequest {
    pub ticker: Option<String>,
    pub date: NaiveDate,
    pub rounds: Option<u32>,
}

/// Roster entry, with performance attached once a run has completed
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub name: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<TraderSummary>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub jobs: usize,
    pub simulation_running: bool,
}
