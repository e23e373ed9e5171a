pub mod config;
pub mod rest;
pub mod storage;
pub mod tasks;

use std::sync::Arc;

use config::ServerConfig;
use tasks::TaskManager;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    /// Validation + orchestration layer over the selected task store.
    pub manager: Arc<TaskManager>,
    pub started_at: std::time::Instant,
}
