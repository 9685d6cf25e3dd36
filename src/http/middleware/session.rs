//! Session middleware and the `CurrentUser` extractor.
//!
//! The middleware resolves the session cookie and attaches a
//! [`CurrentUser`] extension when it maps to a live session. Handlers
//! that require authentication take `CurrentUser` as an extractor and
//! get a 401 when the extension is absent.

use axum::{
    body::Body,
    extract::{FromRequestParts, OptionalFromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::http::server::AppState;
use crate::security::sessions::{CurrentUser, SESSION_COOKIE};

/// Pull a cookie value out of a `Cookie:` header line.
fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Resolve the session cookie into a [`CurrentUser`] extension.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, SESSION_COOKIE))
        .map(str::to_owned);

    if let Some(token) = token {
        if let Some(session) = state.sessions.get_valid(&token, Utc::now()) {
            if let Some(user) = state.store.user(session.user_id) {
                request.extensions_mut().insert(CurrentUser {
                    user_id: user.id,
                    username: user.username.clone(),
                    email: user.email.clone(),
                    display_name: user.display().to_string(),
                });
            }
        }
    }

    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Authentication required"))
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for CurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_parsing() {
        let header = "theme=dark; console_session=abc123; other=1";
        assert_eq!(cookie_value(header, SESSION_COOKIE), Some("abc123"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("", SESSION_COOKIE), None);
    }
}
