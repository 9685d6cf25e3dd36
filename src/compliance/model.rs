//! Compliance record types and list filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::orgs::model::OrgId;

pub type RecordId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Complete,
    Failed,
}

impl RecordStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "complete" => Some(Self::Complete),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }
}

/// A tracked requirement for an organisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub id: RecordId,
    pub org_id: OrgId,
    pub requirement: String,
    pub status: RecordStatus,
    pub last_updated: DateTime<Utc>,
}

/// Filter over a record listing. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Exact status match.
    pub status: Option<RecordStatus>,
    /// Case-insensitive substring of the requirement text.
    pub requirement_contains: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ComplianceRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(needle) = &self.requirement_contains {
            if !record
                .requirement
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(requirement: &str, status: RecordStatus) -> ComplianceRecord {
        ComplianceRecord {
            id: 1,
            org_id: 1,
            requirement: requirement.into(),
            status,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record("Annual pen test", RecordStatus::Pending)));
    }

    #[test]
    fn test_status_filter() {
        let filter = RecordFilter {
            status: Some(RecordStatus::Failed),
            ..Default::default()
        };
        assert!(filter.matches(&record("Patching cadence", RecordStatus::Failed)));
        assert!(!filter.matches(&record("Patching cadence", RecordStatus::Complete)));
    }

    #[test]
    fn test_requirement_substring_is_case_insensitive() {
        let filter = RecordFilter {
            requirement_contains: Some("PEN TEST".into()),
            ..Default::default()
        };
        assert!(filter.matches(&record("Annual pen test", RecordStatus::Pending)));
        assert!(!filter.matches(&record("Backup drill", RecordStatus::Pending)));
    }
}
