//! Login and logout handlers.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::sessions::{verify_password, SESSION_COOKIE};
use crate::ui::pages;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn session_cookie(token: &str, max_age_secs: u64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    ))
    .ok()
}

/// Render the login form.
pub async fn login_page(State(state): State<AppState>) -> Response {
    let config = state.config.load();
    let body = pages::login_body(None);
    crate::http::response::html(pages::shell(&config.ui.title, &config.ui.busy_class, "", &body))
}

/// Verify credentials and issue a session cookie.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let config = state.config.load();
    let now = Utc::now();
    state.sessions.purge_expired(now);

    let user = state.store.user_by_name(form.username.trim());
    let verified = user
        .as_ref()
        .map(|u| verify_password(&form.password, &u.password_sha256))
        .unwrap_or(false);

    let Some(user) = user.filter(|_| verified) else {
        tracing::warn!(username = %form.username, "Failed login attempt");
        metrics::record_login(false);
        let body = pages::login_body(Some("Unknown user or wrong password."));
        let page = pages::shell(&config.ui.title, &config.ui.busy_class, "", &body);
        return (StatusCode::UNAUTHORIZED, crate::http::response::html(page)).into_response();
    };

    let session = state
        .sessions
        .create(user.id, config.security.session_ttl_secs, now);

    tracing::info!(username = %user.username, "User signed in");
    metrics::record_login(true);

    let mut response = Redirect::to("/").into_response();
    if let Some(cookie) = session_cookie(&session.token, config.security.session_ttl_secs) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// Revoke the current session and clear the cookie.
pub async fn logout(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Response {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (key, value) = pair.trim().split_once('=')?;
                (key == SESSION_COOKIE).then_some(value)
            })
        })
    {
        state.sessions.revoke(token);
    }

    let mut response = Redirect::to("/login").into_response();
    if let Some(cookie) = session_cookie("", 0) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
