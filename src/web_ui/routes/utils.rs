//! Shared utilities and helper functions for web UI.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tera::Context;

use crate::auth::Session;
use crate::error::ServerError;
use crate::state::AppState;
use crate::web_ui::templates;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Helper to render a template
pub fn render_template(name: &str, context: &Context) -> Response {
    match templates::render(name, context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response()
        }
    }
}

/// Helper to render an error page with a status code
pub fn render_error_status(status: StatusCode, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("message", message);

    match templates::render("error.html", &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, message.to_string()).into_response(),
    }
}

/// Render a failed request as an error page; server-side failures are logged
pub fn render_server_error(err: ServerError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    }
    render_error_status(status, &err.public_message())
}

/// Asynchronous (XHR) requests announce themselves with `X-Requested-With`
pub fn is_ajax_request(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.eq_ignore_ascii_case("XMLHttpRequest"))
        .unwrap_or(false)
}

/// Extract the session token from the cookie header
pub fn get_session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get("cookie")?.to_str().ok()?;
    cookie_header.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|token| !token.is_empty())
            .map(String::from)
    })
}

/// Current session, if the request carries a live one
pub fn get_current_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = get_session_token(headers)?;
    state.auth.session(&token)
}

/// Redirect to the login page, coming back to `next` afterwards
pub fn login_redirect(next: &str) -> Response {
    Redirect::to(&format!("/account/login/?next={}", urlencoding::encode(next))).into_response()
}

/// The current session, or a redirect to the login page
pub fn require_login(state: &AppState, headers: &HeaderMap, next: &str) -> Result<Session, Response> {
    get_current_session(state, headers).ok_or_else(|| login_redirect(next))
}

/// Context with the fields every page expects
pub fn base_context(section: &str, session: Option<&Session>) -> Context {
    let mut context = Context::new();
    context.insert("section", section);
    if let Some(session) = session {
        context.insert("current_user", &session.username);
    }
    context
}

/// Only local paths are accepted as post-login redirect targets
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") => n,
        _ => "/images/",
    }
}

/// Format seconds ago as human-readable string
pub fn format_time_ago(seconds: i64) -> String {
    if seconds < 0 {
        return "in the future".to_string();
    }
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{} minute{} ago", minutes, if minutes == 1 { "" } else { "s" });
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" });
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{} day{} ago", days, if days == 1 { "" } else { "s" });
    }
    let months = days / 30;
    if months < 12 {
        return format!("{} month{} ago", months, if months == 1 { "" } else { "s" });
    }
    let years = months / 12;
    format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
}

/// Format a Unix timestamp as a relative time string
pub fn format_relative_time(timestamp: i64) -> String {
    format_time_ago(crate::db::now_secs() - timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("theme=dark; session=abc123; other=1"));
        assert_eq!(get_session_token(&headers).as_deref(), Some("abc123"));

        headers.insert("cookie", HeaderValue::from_static("sessionid=nope; session="));
        assert_eq!(get_session_token(&headers), None);
    }

    #[test]
    fn test_is_ajax_request() {
        let mut headers = HeaderMap::new();
        assert!(!is_ajax_request(&headers));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(is_ajax_request(&headers));
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/images/ranking/")), "/images/ranking/");
        assert_eq!(safe_next(Some("//evil.example")), "/images/");
        assert_eq!(safe_next(Some("https://evil.example")), "/images/");
        assert_eq!(safe_next(None), "/images/");
    }

    #[test]
    fn test_format_time_ago() {
        assert_eq!(format_time_ago(5), "just now");
        assert_eq!(format_time_ago(60), "1 minute ago");
        assert_eq!(format_time_ago(7200), "2 hours ago");
        assert_eq!(format_time_ago(-1), "in the future");
    }
}
