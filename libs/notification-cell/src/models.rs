use std::time::Duration;

use serde::{Deserialize, Serialize};

use shared_config::AppConfig;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub poll_interval: Duration,
    /// Applied to every fetch, send and status update the dispatcher makes.
    pub operation_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(shared_config::DEFAULT_POLL_INTERVAL_SECONDS),
            operation_timeout: Duration::from_secs(shared_config::DEFAULT_OPERATION_TIMEOUT_SECONDS),
        }
    }
}

impl DispatcherConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.notification_poll_interval_seconds),
            operation_timeout: Duration::from_secs(config.notification_operation_timeout_seconds),
        }
    }
}

/// Outcome counters for one dispatch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    /// Transition found the notification no longer pending.
    pub skipped: usize,
    pub update_errors: usize,
    /// Shutdown was requested before every due item was processed.
    pub interrupted: bool,
}

impl CycleReport {
    pub fn processed(&self) -> usize {
        self.sent + self.failed + self.skipped + self.update_errors
    }
}
