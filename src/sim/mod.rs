//! Simulation engine: trading calendar, background job lifecycle, and the
//! daily debate-then-trade pipeline.

pub mod calendar;
mod job;
mod runner;

pub use job::{JobRegistry, JobState, JobStatus};
pub use runner::{DayRecord, SimulationRunner, SimulationResult, TraderSummary};
