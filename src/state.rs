use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::counters::CounterStore;
use crate::images::views::ViewTracker;

/// Application state shared across handlers
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub auth: AuthManager,
    pub views: ViewTracker,
    pub config: ServerConfig,
}

impl AppState {
    /// Wire up state from already constructed collaborators
    pub fn new(
        config: ServerConfig,
        db: Arc<DatabaseConnection>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        tracing::info!("Using {} counter store", counters.name());
        Self {
            db,
            auth: AuthManager::new(),
            views: ViewTracker::new(counters),
            config,
        }
    }
}
