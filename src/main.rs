mod auth;
mod config;
mod counters;
mod db;
mod error;
mod images;
mod state;
mod web_ui;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::ServerConfig;
use state::AppState;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagemarks_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Initialize database
    let db_path = config.database_path();
    let db = db::init_database(&db_path)
        .await
        .expect("Failed to initialize database");
    tracing::info!("Database initialized at {:?}", db_path);

    // Counter store for views and the ranking
    let counters = config
        .counters
        .build()
        .await
        .expect("Failed to connect counter store");
    if let Err(e) = counters.ping().await {
        tracing::warn!("Counter store is not answering yet: {}", e);
    }

    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(config, Arc::new(db), counters));

    // Ensure default admin user exists (for bootstrapping)
    state
        .auth
        .ensure_user(&state.db, "admin", "admin")
        .await
        .expect("Failed to create admin user");

    // Sessions live in memory; drop the expired ones periodically
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.auth.cleanup_expired();
        }
    });

    let app = Router::new()
        .merge(web_ui::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Imagemarks server starting on http://{}", addr);
    tracing::info!("Default admin: admin/admin");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
