//! Incident handlers: list fragment, create, report submission, export.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::http::response::{self, is_hx_request};
use crate::http::server::AppState;
use crate::incidents::annex::incident_to_annex;
use crate::incidents::model::{Classification, Incident, IncidentId, IncidentStatus, Severity};
use crate::orgs::handlers::require_member;
use crate::orgs::model::OrgId;
use crate::security::sessions::CurrentUser;
use crate::ui::fragments;

/// Accepts RFC 3339 or the `datetime-local` input format.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// GET /orgs/{org_id}/incidents: the incidents table.
pub async fn incidents_block(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<OrgId>,
) -> Response {
    let (org, _membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let window = state.config.load().incidents.report_window_hours;
    let incidents = state.store.incidents_for_org(org.id);
    response::html(fragments::incidents_block(&org, &incidents, window, Utc::now()))
}

#[derive(Debug, Deserialize)]
pub struct IncidentCreateForm {
    pub title: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub severity: String,
    pub aware_at: String,
    #[serde(default)]
    pub description: String,
}

/// POST /orgs/{org_id}/incidents: open a new incident.
pub async fn incident_create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<OrgId>,
    Form(form): Form<IncidentCreateForm>,
) -> Response {
    let (org, _membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let title = form.title.trim();
    if title.is_empty() {
        return (StatusCode::BAD_REQUEST, "Incident title is required.").into_response();
    }

    let Some(aware_at) = parse_timestamp(form.aware_at.trim()) else {
        return (StatusCode::BAD_REQUEST, "aware_at must be a valid timestamp.").into_response();
    };

    let classification =
        Classification::parse(&form.classification).unwrap_or(Classification::Other);
    let severity = Severity::parse(&form.severity).unwrap_or(Severity::Medium);

    let now = Utc::now();
    let incident = state.store.insert_incident(Incident {
        id: 0,
        org_id: org.id,
        title: title.to_string(),
        classification,
        severity,
        status: IncidentStatus::Open,
        aware_at,
        reported_at: None,
        report_notes: String::new(),
        report_reference: String::new(),
        description: form.description.trim().to_string(),
        owner: Some(user.user_id),
        created_at: now,
        updated_at: now,
    });

    tracing::info!(
        org_id = org.id,
        incident_id = incident.id,
        severity = %severity.as_str(),
        "Incident created"
    );
    Json(json!({ "id": incident.id })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ReportForm {
    pub report_notes: Option<String>,
    pub report_reference: Option<String>,
    pub dom_prefix: Option<String>,
}

/// POST /orgs/{org_id}/incidents/{incident_id}/submit-report
///
/// Marks an incident as reported and returns:
/// - the updated status cell (normal swap)
/// - the updated timer cell (out-of-band swap)
pub async fn incident_submit_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, incident_id)): Path<(OrgId, IncidentId)>,
    headers: HeaderMap,
    Form(form): Form<ReportForm>,
) -> Response {
    tracing::info!(
        org_id,
        incident_id,
        hx = is_hx_request(&headers),
        "Report submission"
    );

    let (org, _membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let Some(mut incident) = state.store.incident(org.id, incident_id) else {
        return (
            StatusCode::NOT_FOUND,
            "Incident not found for this organisation.",
        )
            .into_response();
    };

    let now = Utc::now();
    incident.submit_report(
        form.report_notes.as_deref(),
        form.report_reference.as_deref(),
        now,
    );
    state.store.update_incident(incident.clone());

    if is_hx_request(&headers) {
        let window = state.config.load().incidents.report_window_hours;
        let dom_prefix = form
            .dom_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or("incidents-block");
        let status_html = fragments::status_cell(&incident, dom_prefix);
        let timer_html = fragments::timer_cell_oob(&incident, window, now, dom_prefix);
        return response::html(format!("{}{}", status_html, timer_html));
    }

    // Non-wire fallback: a minimal confirmation.
    response::html("Reported".to_string())
}

/// GET /orgs/{org_id}/incidents/{incident_id}/annex.json
pub async fn incident_annex(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, incident_id)): Path<(OrgId, IncidentId)>,
) -> Response {
    let (org, _membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let Some(incident) = state.store.incident(org.id, incident_id) else {
        return (
            StatusCode::NOT_FOUND,
            "Incident not found for this organisation.",
        )
            .into_response();
    };

    Json(incident_to_annex(
        &incident,
        &org,
        &user.display_name,
        &user.email,
    ))
    .into_response()
}
