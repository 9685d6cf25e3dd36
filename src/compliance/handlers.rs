//! Compliance record handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::compliance::model::{RecordFilter, RecordId, RecordStatus};
use crate::http::response;
use crate::http::server::AppState;
use crate::orgs::handlers::require_member;
use crate::orgs::model::OrgId;
use crate::security::sessions::CurrentUser;
use crate::ui::fragments;

#[derive(Debug, Deserialize, Default)]
pub struct RecordQuery {
    #[serde(default)]
    pub status: String,
    /// Requirement substring filter.
    #[serde(default)]
    pub q: String,
}

impl RecordQuery {
    fn to_filter(&self) -> RecordFilter {
        RecordFilter {
            status: RecordStatus::parse(&self.status),
            requirement_contains: {
                let q = self.q.trim();
                (!q.is_empty()).then(|| q.to_string())
            },
        }
    }
}

/// GET /orgs/{org_id}/records: the records table, optionally filtered.
pub async fn records_block(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<OrgId>,
    Query(query): Query<RecordQuery>,
) -> Response {
    let (org, _membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let records = state.store.records_for_org(org.id, &query.to_filter());
    response::html(fragments::records_block(&org, &records))
}

#[derive(Debug, Deserialize)]
pub struct RecordCreateForm {
    pub requirement: String,
}

/// POST /orgs/{org_id}/records: track a new requirement.
pub async fn record_create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<OrgId>,
    Form(form): Form<RecordCreateForm>,
) -> Response {
    let (org, _membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let requirement = form.requirement.trim();
    if requirement.is_empty() {
        return (StatusCode::BAD_REQUEST, "Requirement text is required.").into_response();
    }

    let record = state.store.create_record(org.id, requirement, Utc::now());
    Json(json!({ "id": record.id })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RecordStatusForm {
    pub status: String,
}

/// POST /orgs/{org_id}/records/{record_id}/status
pub async fn record_status_update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, record_id)): Path<(OrgId, RecordId)>,
    Form(form): Form<RecordStatusForm>,
) -> Response {
    let (org, _membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let Some(status) = RecordStatus::parse(&form.status) else {
        return (StatusCode::BAD_REQUEST, "Invalid status.").into_response();
    };

    let Some(mut record) = state.store.record(org.id, record_id) else {
        return (StatusCode::NOT_FOUND, "Record not found.").into_response();
    };

    record.status = status;
    record.last_updated = Utc::now();
    state.store.update_record(record);

    let records = state.store.records_for_org(org.id, &RecordFilter::default());
    response::html(fragments::records_block(&org, &records))
}
