//! Incident domain types and the reporting clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::orgs::model::{OrgId, UserId};

pub type IncidentId = u64;

/// What the incident affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Availability,
    Integrity,
    Confidentiality,
    Other,
}

impl Classification {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "availability" => Some(Self::Availability),
            "integrity" => Some(Self::Integrity),
            "confidentiality" => Some(Self::Confidentiality),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::Integrity => "integrity",
            Self::Confidentiality => "confidentiality",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Availability => "Availability",
            Self::Integrity => "Integrity",
            Self::Confidentiality => "Confidentiality",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Contained,
    Resolved,
    Closed,
    Reported,
}

impl IncidentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "contained" => Some(Self::Contained),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            "reported" => Some(Self::Reported),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Contained => "contained",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Reported => "reported",
        }
    }
}

/// An incident inside an organisation. `aware_at` starts the regulator
/// notification clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub org_id: OrgId,
    pub title: String,
    pub classification: Classification,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub aware_at: DateTime<Utc>,
    pub reported_at: Option<DateTime<Utc>>,
    pub report_notes: String,
    pub report_reference: String,
    pub description: String,
    pub owner: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Notification deadline for a `window_hours`-hour reporting window.
    pub fn deadline_at(&self, window_hours: i64) -> DateTime<Utc> {
        self.aware_at + Duration::hours(window_hours)
    }

    pub fn is_overdue(&self, window_hours: i64, now: DateTime<Utc>) -> bool {
        now > self.deadline_at(window_hours)
    }

    /// Seconds left on the clock; negative once overdue. `None` once the
    /// report has been filed, because the clock stops mattering.
    pub fn seconds_to_deadline(&self, window_hours: i64, now: DateTime<Utc>) -> Option<i64> {
        if self.reported_at.is_some() {
            return None;
        }
        Some((self.deadline_at(window_hours) - now).num_seconds())
    }

    /// Record a report submission. Notes and reference are normalised;
    /// `reported_at` is only set the first time, so re-submits are safe.
    pub fn submit_report(
        &mut self,
        notes: Option<&str>,
        reference: Option<&str>,
        now: DateTime<Utc>,
    ) {
        if let Some(notes) = notes {
            self.report_notes = notes.trim().to_string();
        }
        if let Some(reference) = reference {
            self.report_reference = reference.trim().to_string();
        }
        if self.reported_at.is_none() {
            self.reported_at = Some(now);
        }
        self.status = IncidentStatus::Reported;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(aware_at: DateTime<Utc>) -> Incident {
        Incident {
            id: 1,
            org_id: 1,
            title: "Substation telemetry loss".into(),
            classification: Classification::Availability,
            severity: Severity::High,
            status: IncidentStatus::Open,
            aware_at,
            reported_at: None,
            report_notes: String::new(),
            report_reference: String::new(),
            description: String::new(),
            owner: None,
            created_at: aware_at,
            updated_at: aware_at,
        }
    }

    #[test]
    fn test_deadline_is_window_after_awareness() {
        let now = Utc::now();
        let inc = incident(now);
        assert_eq!(inc.deadline_at(72), now + Duration::hours(72));
        assert!(!inc.is_overdue(72, now + Duration::hours(71)));
        assert!(inc.is_overdue(72, now + Duration::hours(73)));
    }

    #[test]
    fn test_seconds_to_deadline_counts_down() {
        let now = Utc::now();
        let inc = incident(now);
        let left = inc.seconds_to_deadline(72, now + Duration::hours(70)).unwrap();
        assert_eq!(left, 2 * 3600);

        let overdue = inc.seconds_to_deadline(72, now + Duration::hours(73)).unwrap();
        assert!(overdue < 0);
    }

    #[test]
    fn test_reported_incident_has_no_countdown() {
        let now = Utc::now();
        let mut inc = incident(now);
        inc.submit_report(Some("filed"), None, now);
        assert_eq!(inc.seconds_to_deadline(72, now), None);
    }

    #[test]
    fn test_submit_report_is_idempotent() {
        let now = Utc::now();
        let mut inc = incident(now);

        inc.submit_report(Some("  first notes  "), Some(" REF-1 "), now);
        assert_eq!(inc.status, IncidentStatus::Reported);
        assert_eq!(inc.reported_at, Some(now));
        assert_eq!(inc.report_notes, "first notes");
        assert_eq!(inc.report_reference, "REF-1");

        let later = now + Duration::hours(1);
        inc.submit_report(Some("updated notes"), None, later);
        // Notes may be amended; the filing time must not move.
        assert_eq!(inc.reported_at, Some(now));
        assert_eq!(inc.report_notes, "updated notes");
        assert_eq!(inc.report_reference, "REF-1");
    }
}
