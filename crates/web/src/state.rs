//! Application state for the web server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use curie_agents::{Orchestrator, ReportGenerator};

/// Shared application state.
pub struct AppState {
    pub generator: ReportGenerator,

    /// Server start time (for health checks)
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            generator: ReportGenerator::new(orchestrator),
            start_time: Instant::now(),
        }
    }

    /// Limit how long a single report may take.
    pub fn with_report_timeout(mut self, timeout: Duration) -> Self {
        self.generator = self.generator.with_timeout(timeout);
        self
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
