//! Health endpoints.
//!
//! # Design Decisions
//! - `/healthz` is liveness: the process is up and the store answers
//! - `/readyz` is readiness: includes entity counts and session count so
//!   an operator can see at a glance what the instance is holding

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::http::server::AppState;

/// GET /healthz
pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    // Touch the store the way the original pinged its database.
    let _ = state.store.counts();
    Json(json!({ "ok": true }))
}

/// GET /readyz
pub async fn readyz(State(state): State<AppState>) -> Json<Value> {
    let counts = state.store.counts();
    Json(json!({
        "status": "ready",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len(),
        "counts": counts,
    }))
}
