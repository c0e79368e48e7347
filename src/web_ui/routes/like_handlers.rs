//! Like/unlike handler for images.

use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::utils::{is_ajax_request, render_server_error, require_login};
use crate::error::ServerError;
use crate::images::likes::{toggle_like, LikeAction, LikeError};
use crate::state::AppState;

/// JSON response for like/unlike
#[derive(serde::Serialize)]
pub struct LikeResponse {
    pub status: &'static str,
}

impl LikeResponse {
    fn ok() -> Self {
        Self { status: "ok" }
    }

    fn ko() -> Self {
        Self { status: "ko" }
    }
}

/// Form for like/unlike
#[derive(serde::Deserialize)]
pub struct LikeForm {
    pub id: Option<String>,
    pub action: Option<String>,
}

/// Like or unlike an image (POST, XHR only)
pub async fn like_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<LikeForm>, FormRejection>,
) -> Response {
    if !is_ajax_request(&headers) {
        return render_server_error(ServerError::InvalidRequest(
            "likes are only accepted over XHR".to_string(),
        ));
    }

    let session = match require_login(&state, &headers, "/images/") {
        Ok(s) => s,
        Err(redirect) => return redirect,
    };

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Unreadable like form from user {}: {}", session.user_id, rejection);
            return Json(LikeResponse::ko()).into_response();
        }
    };

    let (Some(raw_id), Some(raw_action)) = (form.id, form.action) else {
        return Json(LikeResponse::ko()).into_response();
    };

    let result = match (raw_id.trim().parse::<i32>(), raw_action.parse::<LikeAction>()) {
        (Ok(image_id), Ok(action)) => toggle_like(&state.db, image_id, action, session.user_id).await,
        (Err(_), _) => Err(LikeError::InvalidAction(format!("bad image id {:?}", raw_id))),
        (_, Err(e)) => Err(e),
    };

    match result {
        Ok(()) => Json(LikeResponse::ok()).into_response(),
        Err(LikeError::Db(e)) => {
            tracing::error!("Like by user {} failed: {}", session.user_id, e);
            Json(LikeResponse::ko()).into_response()
        }
        Err(e) => {
            tracing::debug!("Rejected like by user {}: {}", session.user_id, e);
            Json(LikeResponse::ko()).into_response()
        }
    }
}
