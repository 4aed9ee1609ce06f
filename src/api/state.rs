use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::sim::{JobRegistry, SimulationRunner};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub runner: SimulationRunner,
    pub config: AppConfig,
    pub registry: Arc<RwLock<JobRegistry>>,
    started_at: Instant,
}

impl AppState {
    pub fn new(runner: SimulationRunner, config: AppConfig) -> Self {
        let registry = runner.registry();
        Self {
            runner,
            config,
            registry,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
