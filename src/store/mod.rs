//! In-memory application store.
//!
//! # Responsibilities
//! - Hold users, orgs, memberships, invites, records, and incidents
//! - Allocate entity ids
//! - Answer the aggregate queries handlers and guards need
//!
//! # Design Decisions
//! - Concurrent maps, values cloned out; no reference escapes a shard lock
//! - Users are synced from config on startup and on hot reload; sessions
//!   reference users by id so a resync does not log anyone out

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::compliance::model::{ComplianceRecord, RecordFilter, RecordId, RecordStatus};
use crate::config::schema::UserConfig;
use crate::incidents::model::{Incident, IncidentId};
use crate::orgs::model::{
    InviteId, Membership, MembershipId, Org, OrgId, OrgInvite, Role, UserId,
};

/// An account, synced from configuration.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_sha256: String,
}

impl User {
    /// Name to show in panels.
    pub fn display(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// Concurrent store shared by all handlers.
#[derive(Default)]
pub struct AppStore {
    users: DashMap<UserId, User>,
    usernames: DashMap<String, UserId>,
    orgs: DashMap<OrgId, Org>,
    memberships: DashMap<MembershipId, Membership>,
    invites: DashMap<InviteId, OrgInvite>,
    invite_tokens: DashMap<String, InviteId>,
    records: DashMap<RecordId, ComplianceRecord>,
    incidents: DashMap<IncidentId, Incident>,
    next_id: AtomicU64,
}

impl AppStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Upsert accounts from config, keyed by username. Existing users
    /// keep their id so sessions and memberships stay valid.
    pub fn sync_users(&self, configured: &[UserConfig]) {
        for entry in configured {
            match self.usernames.get(&entry.username).map(|r| *r.value()) {
                Some(id) => {
                    if let Some(mut user) = self.users.get_mut(&id) {
                        user.email = entry.email.clone();
                        user.display_name = entry.display_name.clone();
                        user.password_sha256 = entry.password_sha256.to_lowercase();
                    }
                }
                None => {
                    let id = self.next_id();
                    self.users.insert(
                        id,
                        User {
                            id,
                            username: entry.username.clone(),
                            email: entry.email.clone(),
                            display_name: entry.display_name.clone(),
                            password_sha256: entry.password_sha256.to_lowercase(),
                        },
                    );
                    self.usernames.insert(entry.username.clone(), id);
                }
            }
        }
        tracing::info!(count = configured.len(), "User accounts synced");
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    pub fn user_by_name(&self, username: &str) -> Option<User> {
        let id = *self.usernames.get(username)?.value();
        self.user(id)
    }

    // ------------------------------------------------------------------
    // Orgs & memberships
    // ------------------------------------------------------------------

    /// Create an org with its creator as the initial active owner.
    pub fn create_org(
        &self,
        name: &str,
        description: &str,
        creator: UserId,
        now: DateTime<Utc>,
    ) -> Org {
        let org = Org {
            id: self.next_id(),
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            created_by: creator,
            created_at: now,
        };
        self.orgs.insert(org.id, org.clone());

        let membership = Membership {
            id: self.next_id(),
            user_id: creator,
            org_id: org.id,
            role: Role::Owner,
            is_active: true,
            invited_by: None,
            invited_at: None,
            accepted_at: Some(now),
        };
        self.memberships.insert(membership.id, membership);

        org
    }

    pub fn org(&self, id: OrgId) -> Option<Org> {
        self.orgs.get(&id).map(|r| r.value().clone())
    }

    /// Orgs the user is an active member of, oldest first.
    pub fn orgs_for_user(&self, user_id: UserId) -> Vec<(Org, Membership)> {
        let mut result: Vec<(Org, Membership)> = self
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id && m.is_active)
            .filter_map(|m| self.org(m.org_id).map(|org| (org, m.value().clone())))
            .collect();
        result.sort_by_key(|(org, _)| org.id);
        result
    }

    pub fn membership(&self, id: MembershipId) -> Option<Membership> {
        self.memberships.get(&id).map(|r| r.value().clone())
    }

    pub fn membership_of(&self, org_id: OrgId, user_id: UserId) -> Option<Membership> {
        self.memberships
            .iter()
            .find(|m| m.org_id == org_id && m.user_id == user_id)
            .map(|m| m.value().clone())
    }

    /// All memberships in an org: by rank (owners first), then username.
    pub fn memberships_for_org(&self, org_id: OrgId) -> Vec<Membership> {
        let mut members: Vec<Membership> = self
            .memberships
            .iter()
            .filter(|m| m.org_id == org_id)
            .map(|m| m.value().clone())
            .collect();
        members.sort_by(|a, b| {
            b.role.cmp(&a.role).then_with(|| {
                let an = self.user(a.user_id).map(|u| u.username).unwrap_or_default();
                let bn = self.user(b.user_id).map(|u| u.username).unwrap_or_default();
                an.cmp(&bn)
            })
        });
        members
    }

    pub fn active_owner_count(&self, org_id: OrgId) -> usize {
        self.memberships
            .iter()
            .filter(|m| m.org_id == org_id && m.role == Role::Owner && m.is_active)
            .count()
    }

    /// Replace a membership wholesale (role/activation changes).
    pub fn update_membership(&self, membership: Membership) {
        self.memberships.insert(membership.id, membership);
    }

    /// Add a membership for an accepted invite. Reactivates and re-roles
    /// an existing membership instead of duplicating it.
    pub fn add_membership(
        &self,
        org_id: OrgId,
        user_id: UserId,
        role: Role,
        invited_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Membership {
        if let Some(mut existing) = self.membership_of(org_id, user_id) {
            existing.is_active = true;
            existing.role = role;
            existing.accepted_at = Some(now);
            self.update_membership(existing.clone());
            return existing;
        }
        let membership = Membership {
            id: self.next_id(),
            user_id,
            org_id,
            role,
            is_active: true,
            invited_by,
            invited_at: Some(now),
            accepted_at: Some(now),
        };
        self.memberships.insert(membership.id, membership.clone());
        membership
    }

    // ------------------------------------------------------------------
    // Invites
    // ------------------------------------------------------------------

    pub fn create_invite(
        &self,
        org_id: OrgId,
        email: &str,
        role: Role,
        invited_by: UserId,
        expires_at: DateTime<Utc>,
    ) -> OrgInvite {
        let invite = OrgInvite {
            id: self.next_id(),
            email: email.trim().to_lowercase(),
            org_id,
            role,
            token: OrgInvite::generate_token(),
            expires_at,
            used_at: None,
            cancelled_at: None,
            invited_by: Some(invited_by),
        };
        self.invites.insert(invite.id, invite.clone());
        self.invite_tokens.insert(invite.token.clone(), invite.id);
        invite
    }

    pub fn invite(&self, id: InviteId) -> Option<OrgInvite> {
        self.invites.get(&id).map(|r| r.value().clone())
    }

    pub fn invite_by_token(&self, token: &str) -> Option<OrgInvite> {
        let id = *self.invite_tokens.get(token)?.value();
        self.invite(id)
    }

    pub fn update_invite(&self, invite: OrgInvite) {
        self.invites.insert(invite.id, invite);
    }

    /// Unused invitations for an org, latest-expiring first.
    pub fn open_invites_for_org(&self, org_id: OrgId) -> Vec<OrgInvite> {
        let mut invites: Vec<OrgInvite> = self
            .invites
            .iter()
            .filter(|i| i.org_id == org_id && i.used_at.is_none())
            .map(|i| i.value().clone())
            .collect();
        invites.sort_by(|a, b| b.expires_at.cmp(&a.expires_at));
        invites
    }

    // ------------------------------------------------------------------
    // Compliance records
    // ------------------------------------------------------------------

    pub fn create_record(
        &self,
        org_id: OrgId,
        requirement: &str,
        now: DateTime<Utc>,
    ) -> ComplianceRecord {
        let record = ComplianceRecord {
            id: self.next_id(),
            org_id,
            requirement: requirement.trim().to_string(),
            status: RecordStatus::Pending,
            last_updated: now,
        };
        self.records.insert(record.id, record.clone());
        record
    }

    pub fn record(&self, org_id: OrgId, id: RecordId) -> Option<ComplianceRecord> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .filter(|r| r.org_id == org_id)
    }

    pub fn update_record(&self, record: ComplianceRecord) {
        self.records.insert(record.id, record);
    }

    /// Records for an org matching `filter`, most recently updated first.
    pub fn records_for_org(&self, org_id: OrgId, filter: &RecordFilter) -> Vec<ComplianceRecord> {
        let mut records: Vec<ComplianceRecord> = self
            .records
            .iter()
            .filter(|r| r.org_id == org_id && filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        records
    }

    // ------------------------------------------------------------------
    // Incidents
    // ------------------------------------------------------------------

    pub fn insert_incident(&self, mut incident: Incident) -> Incident {
        incident.id = self.next_id();
        self.incidents.insert(incident.id, incident.clone());
        incident
    }

    /// Incident scoped to the org, so ids cannot be guessed across orgs.
    pub fn incident(&self, org_id: OrgId, id: IncidentId) -> Option<Incident> {
        self.incidents
            .get(&id)
            .map(|r| r.value().clone())
            .filter(|i| i.org_id == org_id)
    }

    pub fn update_incident(&self, incident: Incident) {
        self.incidents.insert(incident.id, incident);
    }

    /// Incidents for an org, newest first.
    pub fn incidents_for_org(&self, org_id: OrgId) -> Vec<Incident> {
        let mut incidents: Vec<Incident> = self
            .incidents
            .iter()
            .filter(|i| i.org_id == org_id)
            .map(|i| i.value().clone())
            .collect();
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        incidents
    }

    /// Entity counts for the readiness endpoint.
    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            users: self.users.len(),
            orgs: self.orgs.len(),
            memberships: self.memberships.len(),
            invites: self.invites.len(),
            records: self.records.len(),
            incidents: self.incidents.len(),
        }
    }
}

/// Snapshot of store sizes.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StoreCounts {
    pub users: usize,
    pub orgs: usize,
    pub memberships: usize,
    pub invites: usize,
    pub records: usize,
    pub incidents: usize,
}
