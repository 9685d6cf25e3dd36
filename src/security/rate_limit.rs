//! Rate limiting for login attempts.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::schema::LoginRateLimitConfig;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// State for the login rate limiter, keyed by client IP.
pub struct RateLimiterState {
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiterState {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Check one attempt against the configured limits. Limits are passed
    /// per call so config hot reloads apply immediately.
    pub fn check(&self, key: &str, limits: &LoginRateLimitConfig) -> bool {
        let burst = limits.burst.max(1) as f64;
        let rps = limits.rps.max(1) as f64;

        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(burst));

        bucket.try_acquire(burst, rps)
    }
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware limiting login attempts per client IP.
pub async fn login_rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<crate::http::server::AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = addr.ip().to_string();
    let limits = state.config.load().security.login.clone();

    if state.login_limiter.check(&key, &limits) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Login rate limit exceeded");
        metrics::record_rate_limited("login");
        let mut response = Response::new(Body::from("Too many login attempts"));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_burst_then_deny() {
        let limiter = RateLimiterState::new();
        let limits = LoginRateLimitConfig { rps: 1, burst: 3 };

        assert!(limiter.check("10.0.0.1", &limits));
        assert!(limiter.check("10.0.0.1", &limits));
        assert!(limiter.check("10.0.0.1", &limits));
        assert!(!limiter.check("10.0.0.1", &limits));

        // A different client has its own bucket.
        assert!(limiter.check("10.0.0.2", &limits));
    }

    #[test]
    fn test_arc_shared() {
        let limiter = Arc::new(RateLimiterState::new());
        let limits = LoginRateLimitConfig { rps: 1, burst: 1 };
        assert!(limiter.check("k", &limits));
        assert!(!limiter.clone().check("k", &limits));
    }
}
