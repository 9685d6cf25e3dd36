//! Wire response helpers.
//!
//! # Responsibilities
//! - Detect wire (`HX-Request`) requests
//! - Build HTML responses, optionally retargeted to another element
//!
//! # Design Decisions
//! - Retargeting uses response headers (`HX-Retarget` / `HX-Reswap`), the
//!   wire library's mechanism for overriding the caller's swap target

use axum::http::{header::HeaderName, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};

/// Request header the wire library sets on every request it issues.
pub const HX_REQUEST: &str = "hx-request";

/// Response header overriding the element the response swaps into.
pub const HX_RETARGET: &str = "hx-retarget";

/// Response header overriding the swap strategy.
pub const HX_RESWAP: &str = "hx-reswap";

/// True when the request came from the wire library rather than a full
/// page navigation.
pub fn is_hx_request(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Plain HTML response.
pub fn html(body: String) -> Response {
    Html(body).into_response()
}

/// HTML response that swaps into `selector` (outerHTML) instead of the
/// caller's declared target.
pub fn html_retargeted(body: String, selector: &str) -> Response {
    let mut response = Html(body).into_response();
    if let Ok(value) = HeaderValue::from_str(selector) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(HX_RETARGET), value);
        response.headers_mut().insert(
            HeaderName::from_static(HX_RESWAP),
            HeaderValue::from_static("outerHTML"),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hx_request_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_hx_request(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        assert!(is_hx_request(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("false"));
        assert!(!is_hx_request(&headers));
    }

    #[test]
    fn test_retarget_headers() {
        let response = html_retargeted("<div></div>".into(), "#sites-block");
        assert_eq!(response.headers()[HX_RETARGET], "#sites-block");
        assert_eq!(response.headers()[HX_RESWAP], "outerHTML");
    }
}
