//! Ranking page showing the most viewed images.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;

use super::utils::{base_context, render_server_error, render_template, require_login};
use crate::images::ranking::top_viewed;
use crate::state::AppState;

/// Most viewed images page
pub async fn ranking_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let session = match require_login(&state, &headers, "/images/ranking/") {
        Ok(s) => s,
        Err(redirect) => return redirect,
    };

    let most_viewed = match top_viewed(&state.db, &state.views, state.config.ranking_size).await {
        Ok(ranked) => ranked,
        Err(e) => return render_server_error(e),
    };

    let mut context = base_context("ranking", Some(&session));
    context.insert("most_viewed", &most_viewed);
    render_template("images/ranking.html", &context)
}
