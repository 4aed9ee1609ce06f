//! Background simulation job lifecycle.
//!
//! The registry keeps every job ever submitted (until reset) keyed by id,
//! plus a single running slot: at most one simulation runs at a time, and
//! claiming the slot is a check-and-set under the registry lock.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::{BullbearError, Result};
use crate::sim::runner::SimulationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Error,
}

/// State of one simulation job. Errors are captured here rather than
/// propagated: a failed run leaves an `Error` job behind for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct JobState {
    pub id: Uuid,
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: JobStatus,
    /// Whole-percent progress, monotonically non-decreasing
    pub progress: u8,
    pub current_date: Option<NaiveDate>,
    pub total_days: usize,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationResult>,
}

/// All known jobs plus the single running slot
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: HashMap<Uuid, JobState>,
    /// Submission order; the last entry is the most recent job
    order: Vec<Uuid>,
    running: Option<Uuid>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Register a new job as running and claim the running slot. Fails
    /// without side effects when another job currently holds the slot.
    pub fn begin(
        &mut self,
        ticker: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_days: usize,
    ) -> Result<Uuid> {
        if self.running.is_some() {
            return Err(BullbearError::JobAlreadyRunning);
        }

        let id = Uuid::new_v4();
        let job = JobState {
            id,
            ticker,
            start_date,
            end_date,
            status: JobStatus::Running,
            progress: 0,
            current_date: None,
            total_days,
            error: None,
            created_at: Utc::now(),
            result: None,
        };
        info!(job_id = %id, ticker = %job.ticker, "simulation job registered");
        self.jobs.insert(id, job);
        self.order.push(id);
        self.running = Some(id);
        Ok(id)
    }

    /// Record progress before a day is simulated. Progress never moves
    /// backwards even if called with a smaller value.
    pub fn advance(&mut self, id: Uuid, current_date: NaiveDate, done: usize, total: usize) {
        if let Some(job) = self.jobs.get_mut(&id) {
            let pct = if total == 0 {
                100
            } else {
                ((done * 100) / total) as u8
            };
            job.progress = job.progress.max(pct);
            job.current_date = Some(current_date);
        }
    }

    pub fn complete(&mut self, id: Uuid, result: SimulationResult) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.result = Some(result);
        }
        if self.running == Some(id) {
            self.running = None;
        }
        info!(job_id = %id, "simulation job completed");
    }

    pub fn fail(&mut self, id: Uuid, message: String) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Error;
            job.error = Some(message);
        }
        if self.running == Some(id) {
            self.running = None;
        }
    }

    /// Look up a job by id, or the most recently submitted one when no id
    /// is given.
    pub fn get(&self, id: Option<Uuid>) -> Result<&JobState> {
        let id = match id {
            Some(id) => id,
            None => *self
                .order
                .last()
                .ok_or(BullbearError::JobNotFound(Uuid::nil()))?,
        };
        self.jobs.get(&id).ok_or(BullbearError::JobNotFound(id))
    }

    /// All jobs in submission order
    pub fn list(&self) -> Vec<&JobState> {
        self.order.iter().filter_map(|id| self.jobs.get(id)).collect()
    }

    /// Clear all job state. Rejected while a job is running so an active
    /// runner task never loses the entry it reports into.
    pub fn reset(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(BullbearError::ResetWhileRunning);
        }
        self.jobs.clear();
        self.order.clear();
        info!("job registry reset");
        Ok(())
    }
}
