pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

use shared_config::AppConfig;
use shared_database::ScheduleStore;

// Re-export the cell surface for external use
pub use models::*;
pub use services::*;

/// Shared axum state: configuration plus the store handle.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: ScheduleStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: ScheduleStore::new(),
        }
    }
}
