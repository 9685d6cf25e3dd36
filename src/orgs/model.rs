//! Organisation domain types.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type OrgId = u64;
pub type MembershipId = u64;
pub type InviteId = u64;

/// Membership role. Derived ordering doubles as the privilege rank:
/// `Member < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
    Owner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Admin, Role::Member];

    /// Parse a role name, case-insensitively. Unknown names are `None`.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Admin => "Admin",
            Role::Member => "Member",
        }
    }
}

/// An organisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Org {
    pub id: OrgId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// A user's membership in an organisation. One per (user, org).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub org_id: OrgId,
    pub role: Role,
    pub is_active: bool,
    pub invited_by: Option<UserId>,
    pub invited_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Membership {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// Owners count as admins.
    pub fn is_admin(&self) -> bool {
        self.role >= Role::Admin
    }
}

/// Derived invitation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteStatus {
    Pending,
    Accepted,
    Cancelled,
}

impl InviteStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "PENDING",
            InviteStatus::Accepted => "ACCEPTED",
            InviteStatus::Cancelled => "CANCELLED",
        }
    }
}

/// An invitation into an organisation, addressed to an email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgInvite {
    pub id: InviteId,
    pub email: String,
    pub org_id: OrgId,
    pub role: Role,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub invited_by: Option<UserId>,
}

impl OrgInvite {
    /// Generate a URL-safe invite token.
    pub fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(43)
            .map(char::from)
            .collect()
    }

    /// Expired invites count as cancelled; a used invite always reads as
    /// accepted, even past its expiry.
    pub fn status(&self, now: DateTime<Utc>) -> InviteStatus {
        if self.used_at.is_some() {
            return InviteStatus::Accepted;
        }
        if self.cancelled_at.is_some() || self.expires_at < now {
            return InviteStatus::Cancelled;
        }
        InviteStatus::Pending
    }

    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == InviteStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_role_rank_ordering() {
        assert!(Role::Owner > Role::Admin);
        assert!(Role::Admin > Role::Member);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Owner"), Some(Role::Owner));
        assert_eq!(Role::parse(" member "), Some(Role::Member));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    fn invite(now: DateTime<Utc>) -> OrgInvite {
        OrgInvite {
            id: 1,
            email: "new@example.com".into(),
            org_id: 1,
            role: Role::Member,
            token: OrgInvite::generate_token(),
            expires_at: now + Duration::days(7),
            used_at: None,
            cancelled_at: None,
            invited_by: None,
        }
    }

    #[test]
    fn test_invite_status_transitions() {
        let now = Utc::now();
        let mut inv = invite(now);
        assert_eq!(inv.status(now), InviteStatus::Pending);

        inv.used_at = Some(now);
        assert_eq!(inv.status(now), InviteStatus::Accepted);

        let mut inv = invite(now);
        inv.cancelled_at = Some(now);
        assert_eq!(inv.status(now), InviteStatus::Cancelled);

        let inv = invite(now);
        let later = now + Duration::days(8);
        assert_eq!(inv.status(later), InviteStatus::Cancelled);
    }

    #[test]
    fn test_invite_tokens_are_distinct() {
        let a = OrgInvite::generate_token();
        let b = OrgInvite::generate_token();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
    }
}
