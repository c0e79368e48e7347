//! Authentication route handlers for login, registration, and logout.

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::utils::{
    base_context, get_current_session, get_session_token, render_server_error,
    render_template, safe_next, SESSION_COOKIE,
};
use crate::auth::AuthError;
use crate::state::AppState;

/// Login form data
#[derive(serde::Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data
#[derive(serde::Deserialize, Default)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// Query params accepted by the login page
#[derive(serde::Deserialize, Default)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub message: Option<String>,
}

fn redirect_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string()), (header::SET_COOKIE, cookie)],
    )
        .into_response()
}

/// Login page (GET)
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let session = get_current_session(&state, &headers);
    let mut context = base_context("", session.as_ref());
    context.insert("next", safe_next(query.next.as_deref()));
    if let Some(msg) = &query.message {
        context.insert("message", msg);
    }
    render_template("account/login.html", &context)
}

/// Login submit (POST)
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref());

    match state.auth.login(&state.db, &form.username, &form.password).await {
        Ok(session) => {
            tracing::info!("User {} logged in", session.username);
            redirect_with_cookie(
                next,
                format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, session.token),
            )
        }
        Err(AuthError::Db(e)) => render_server_error(e.into()),
        Err(e) => {
            let mut context = base_context("", None);
            context.insert("error", &e.to_string());
            context.insert("next", next);
            render_template("account/login.html", &context)
        }
    }
}

/// Registration page (GET)
pub async fn register_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = get_current_session(&state, &headers);
    render_template("account/register.html", &base_context("", session.as_ref()))
}

/// Registration submit (POST)
pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match state
        .auth
        .register_user(&state.db, &form.username, &form.password, form.email.as_deref())
        .await
    {
        Ok(_) => Redirect::to("/account/login/?message=Account+created%2C+please+log+in.").into_response(),
        Err(AuthError::Db(e)) => render_server_error(e.into()),
        Err(e) => {
            let mut context = base_context("", None);
            context.insert("error", &e.to_string());
            render_template("account/register.html", &context)
        }
    }
}

/// Logout (GET)
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = get_session_token(&headers) {
        state.auth.logout(&token);
    }
    redirect_with_cookie(
        "/account/login/",
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE),
    )
}
