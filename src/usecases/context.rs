use tracing_appender::non_blocking::WorkerGuard;

use crate::infra::{config::AppConfig, storage_layout::StorageLayout};

pub struct AppContext {
    pub config: AppConfig,
    pub layout: StorageLayout,
    /// Flushes the log file when dropped.
    _log_guard: Option<WorkerGuard>,
}

impl AppContext {
    pub fn new(config: AppConfig, layout: StorageLayout, log_guard: Option<WorkerGuard>) -> Self {
        Self {
            config,
            layout,
            _log_guard: log_guard,
        }
    }
}
