//! Annex E style JSON export for regulator notification.
//!
//! The payload layout (contact_info / org_details / incident_times /
//! description / root_cause) follows the NIS incident reporting annex the
//! console's reports are filed under. Absent values are empty strings or
//! nulls, never missing keys, so downstream form-fillers can rely on the
//! shape.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::incidents::model::{Incident, Severity};
use crate::orgs::model::Org;

/// Minute-precision ISO 8601, or `null`.
fn fmt(dt: Option<DateTime<Utc>>) -> Value {
    match dt {
        Some(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M%:z").to_string()),
        None => Value::Null,
    }
}

/// `"Hh MMm"` between awareness and filing (never negative), or `None`
/// when the report has not been filed.
pub fn reported_hm(aware_at: DateTime<Utc>, reported_at: Option<DateTime<Utc>>) -> Option<String> {
    let reported_at = reported_at?;
    let total_minutes = (reported_at - aware_at).num_minutes().max(0);
    let (h, m) = (total_minutes / 60, total_minutes % 60);
    Some(format!("{}h {:02}m", h, m))
}

/// The annex severity scale tops out at "major", not "critical".
fn annex_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "major",
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
    }
}

/// Build the annex payload for an incident.
pub fn incident_to_annex(
    incident: &Incident,
    org: &Org,
    reporter_name: &str,
    reporter_email: &str,
) -> Value {
    let duration = reported_hm(incident.aware_at, incident.reported_at);

    json!({
        "contact_info": {
            "name": reporter_name,
            "role": "",
            "phone": "",
            "email": reporter_email,
        },
        "org_details": {
            "organisation": org.name,
            "essential_service": "",
            "sites_assets": [],
            "internal_incident_id": incident.id.to_string(),
        },
        "incident_times": {
            "detected_at": fmt(Some(incident.aware_at)),
            "occurred_at": Value::Null,
            "reported_internally_at": fmt(incident.reported_at),
        },
        "type_of_incident": incident.classification.label(),
        "status": "detected",
        "stage": "",
        "description": {
            "incident_types": [],
            "summary": incident.title.trim(),
            "discovery": "",
            "duration": duration.unwrap_or_default(),
            "locations": [],
            "services_systems_affected": [],
            "impact_on_services_users": incident.description.trim(),
            "impact_on_safety": "",
            "suspected_cause": "",
            "cross_border_impact": "",
            "other_relevant_info": incident.report_notes.trim(),
        },
        "root_cause": {
            "category": "other",
            "other_text": "",
        },
        "categorisation": "",
        "severity": annex_severity(incident.severity),
        "mitigations": "",
        "who_else_informed": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidents::model::{Classification, IncidentStatus};
    use chrono::Duration;

    fn fixture() -> (Incident, Org) {
        let aware = Utc::now();
        let incident = Incident {
            id: 7,
            org_id: 3,
            title: "  Feeder outage  ".into(),
            classification: Classification::Availability,
            severity: Severity::Critical,
            status: IncidentStatus::Open,
            aware_at: aware,
            reported_at: None,
            report_notes: "escalated to NOC".into(),
            report_reference: String::new(),
            description: "loss of supply to 3 substations".into(),
            owner: None,
            created_at: aware,
            updated_at: aware,
        };
        let org = Org {
            id: 3,
            name: "Grid North".into(),
            description: String::new(),
            created_by: 1,
            created_at: aware,
        };
        (incident, org)
    }

    #[test]
    fn test_reported_hm_formatting() {
        let aware = Utc::now();
        let filed = aware + Duration::minutes(18 * 60 + 5);
        assert_eq!(reported_hm(aware, Some(filed)), Some("18h 05m".into()));
        assert_eq!(reported_hm(aware, None), None);
        // Filing timestamped before awareness clamps to zero.
        assert_eq!(
            reported_hm(aware, Some(aware - Duration::minutes(10))),
            Some("0h 00m".into())
        );
    }

    #[test]
    fn test_payload_required_sections() {
        let (incident, org) = fixture();
        let payload = incident_to_annex(&incident, &org, "Dana Ops", "dana@gridnorth.example");

        assert_eq!(payload["org_details"]["organisation"], "Grid North");
        assert_eq!(payload["org_details"]["internal_incident_id"], "7");
        assert_eq!(payload["contact_info"]["email"], "dana@gridnorth.example");
        assert_eq!(payload["description"]["summary"], "Feeder outage");
        assert_eq!(payload["severity"], "major");
        assert!(payload["incident_times"]["detected_at"].is_string());
        assert!(payload["incident_times"]["reported_internally_at"].is_null());
        assert_eq!(payload["description"]["duration"], "");
    }

    #[test]
    fn test_payload_duration_once_reported() {
        let (mut incident, org) = fixture();
        let filed = incident.aware_at + Duration::hours(2);
        incident.submit_report(None, None, filed);

        let payload = incident_to_annex(&incident, &org, "Dana Ops", "dana@gridnorth.example");
        assert_eq!(payload["description"]["duration"], "2h 00m");
        assert!(payload["incident_times"]["reported_internally_at"].is_string());
    }
}
