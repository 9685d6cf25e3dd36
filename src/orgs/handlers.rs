//! Organisation and membership handlers.
//!
//! Mutations re-render the whole members panel, success or failure; a
//! guard rejection comes back as the same panel with an inline error and
//! status 200 so the wire swap still lands.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::http::response;
use crate::http::server::AppState;
use crate::orgs::guards;
use crate::orgs::model::{InviteId, Membership, MembershipId, Org, OrgId, Role};
use crate::security::sessions::CurrentUser;
use crate::store::User;
use crate::ui::fragments;

/// Resolve an org and the caller's active membership, or the error
/// response the caller should see.
pub(crate) fn require_member(
    state: &AppState,
    org_id: OrgId,
    user_id: u64,
) -> Result<(Org, Membership), Response> {
    let Some(org) = state.store.org(org_id) else {
        return Err((StatusCode::NOT_FOUND, "Organisation not found.").into_response());
    };
    match state.store.membership_of(org_id, user_id) {
        Some(membership) if membership.is_active => Ok((org, membership)),
        _ => Err((
            StatusCode::FORBIDDEN,
            "You don't have access to this organisation.",
        )
            .into_response()),
    }
}

/// Render the members panel fragment.
pub(crate) fn render_members_panel(
    state: &AppState,
    org: &Org,
    acting_role: Option<Role>,
    ok: Option<&str>,
    error: Option<&str>,
) -> Response {
    let now = Utc::now();
    let rows: Vec<(Membership, User)> = state
        .store
        .memberships_for_org(org.id)
        .into_iter()
        .filter_map(|m| state.store.user(m.user_id).map(|u| (m, u)))
        .collect();
    let invitations = state.store.open_invites_for_org(org.id);
    response::html(fragments::members_panel(
        org,
        &rows,
        &invitations,
        acting_role,
        ok,
        error,
        now,
    ))
}

#[derive(Debug, Deserialize)]
pub struct OrgCreateForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// POST /orgs: create an organisation owned by the caller.
pub async fn org_create(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<OrgCreateForm>,
) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "Organisation name is required.").into_response();
    }

    let org = state
        .store
        .create_org(name, &form.description, user.user_id, Utc::now());
    tracing::info!(org = %org.name, org_id = org.id, user = %user.username, "Organisation created");

    Json(json!({ "id": org.id, "name": org.name })).into_response()
}

/// GET /orgs/{org_id}/members: the members panel.
pub async fn members_block(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<OrgId>,
) -> Response {
    let (org, membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };
    render_members_panel(&state, &org, Some(membership.role), None, None)
}

#[derive(Debug, Deserialize)]
pub struct InviteForm {
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// POST /orgs/{org_id}/invites: invite an email address.
pub async fn invite_create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<OrgId>,
    Form(form): Form<InviteForm>,
) -> Response {
    let (org, membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    if !membership.is_admin() {
        return render_members_panel(
            &state,
            &org,
            Some(membership.role),
            None,
            Some("Only admins can invite members."),
        );
    }

    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return render_members_panel(
            &state,
            &org,
            Some(membership.role),
            None,
            Some("A valid email address is required."),
        );
    }

    let role = if form.role.trim().is_empty() {
        Role::Member
    } else {
        match Role::parse(&form.role) {
            Some(role) => role,
            None => {
                return render_members_panel(
                    &state,
                    &org,
                    Some(membership.role),
                    None,
                    Some("Invalid role."),
                );
            }
        }
    };

    let expires_at = Utc::now() + Duration::days(state.config.load().invites.expiry_days);
    let invite = state
        .store
        .create_invite(org.id, email, role, user.user_id, expires_at);
    tracing::info!(org_id = org.id, email = %invite.email, role = %role.as_str(), "Invitation created");

    let ok = format!("Invitation sent to {}.", invite.email);
    render_members_panel(&state, &org, Some(membership.role), Some(&ok), None)
}

/// POST /orgs/{org_id}/invites/{invite_id}/cancel
pub async fn invite_cancel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, invite_id)): Path<(OrgId, InviteId)>,
) -> Response {
    let (org, membership) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    if !membership.is_admin() {
        return render_members_panel(
            &state,
            &org,
            Some(membership.role),
            None,
            Some("Only admins can manage invitations."),
        );
    }

    let now = Utc::now();
    let invite = state.store.invite(invite_id).filter(|i| i.org_id == org.id);
    match invite {
        Some(mut invite) if invite.is_pending(now) => {
            invite.cancelled_at = Some(now);
            state.store.update_invite(invite);
            render_members_panel(
                &state,
                &org,
                Some(membership.role),
                Some("Invitation cancelled."),
                None,
            )
        }
        Some(_) => render_members_panel(
            &state,
            &org,
            Some(membership.role),
            None,
            Some("Invitation is no longer pending."),
        ),
        None => (StatusCode::NOT_FOUND, "Invitation not found.").into_response(),
    }
}

/// POST /invites/accept/{token}: join an org via an invitation link.
pub async fn invite_accept(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(token): Path<String>,
) -> Response {
    let Some(mut invite) = state.store.invite_by_token(&token) else {
        return (StatusCode::NOT_FOUND, "Invitation not found.").into_response();
    };

    let now = Utc::now();
    if !invite.is_pending(now) {
        return (StatusCode::BAD_REQUEST, "Invitation is no longer valid.").into_response();
    }

    invite.used_at = Some(now);
    state.store.update_invite(invite.clone());
    state
        .store
        .add_membership(invite.org_id, user.user_id, invite.role, invite.invited_by, now);

    tracing::info!(org_id = invite.org_id, user = %user.username, "Invitation accepted");
    Redirect::to(&format!("/orgs/{}/members", invite.org_id)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// POST /orgs/{org_id}/members/{member_id}/role
pub async fn member_role_update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, member_id)): Path<(OrgId, MembershipId)>,
    Form(form): Form<RoleForm>,
) -> Response {
    let (org, actor) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let Some(mut target) = state.store.membership(member_id).filter(|m| m.org_id == org.id)
    else {
        return (StatusCode::NOT_FOUND, "Member not found.").into_response();
    };

    let owner_count = state.store.active_owner_count(org.id);
    match guards::guard_role_change(&actor, &target, &form.role, owner_count) {
        Ok(new_role) => {
            target.role = new_role;
            state.store.update_membership(target);
            render_members_panel(&state, &org, Some(actor.role), Some("Role updated."), None)
        }
        Err(e) => render_members_panel(&state, &org, Some(actor.role), None, Some(&e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub active: String,
}

/// POST /orgs/{org_id}/members/{member_id}/toggle
pub async fn member_toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, member_id)): Path<(OrgId, MembershipId)>,
    Form(form): Form<ToggleForm>,
) -> Response {
    let (org, actor) = match require_member(&state, org_id, user.user_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let Some(mut target) = state.store.membership(member_id).filter(|m| m.org_id == org.id)
    else {
        return (StatusCode::NOT_FOUND, "Member not found.").into_response();
    };

    let new_active = matches!(form.active.trim(), "1" | "true" | "on");
    let owner_count = state.store.active_owner_count(org.id);
    match guards::guard_toggle_active(&actor, &target, new_active, owner_count) {
        Ok(()) => {
            target.is_active = new_active;
            state.store.update_membership(target);
            render_members_panel(&state, &org, Some(actor.role), Some("Member updated."), None)
        }
        Err(e) => render_members_panel(&state, &org, Some(actor.role), None, Some(&e.to_string())),
    }
}
