//! Web UI route handlers.

mod auth_handlers;
mod image_handlers;
mod like_handlers;
mod ranking_handlers;
mod utils;

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::state::AppState;

pub use auth_handlers::*;
pub use image_handlers::*;
pub use like_handlers::*;
pub use ranking_handlers::*;

/// Create the web UI router with all page routes
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        // Images
        .route("/images/", get(image_list))
        .route("/images/create/", get(create_page).post(create_submit))
        .route("/images/like/", post(like_image))
        .route("/images/ranking/", get(ranking_page))
        .route("/images/:id/:slug/", get(image_detail))
        // Accounts
        .route("/account/login/", get(login_page).post(login_submit))
        .route("/account/register/", get(register_page).post(register_submit))
        .route("/account/logout/", get(logout))
}

async fn index() -> Redirect {
    Redirect::to("/images/")
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    counters: &'static str,
    counters_ok: bool,
}

/// Liveness plus counter store reachability
async fn health(State(state): State<Arc<AppState>>) -> Response {
    let store = state.views.store();
    let counters_ok = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Counter store ping failed: {}", e);
            false
        }
    };
    Json(HealthResponse {
        status: "ok",
        counters: store.name(),
        counters_ok,
    })
    .into_response()
}
