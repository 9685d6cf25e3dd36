//! Membership mutation guards.
//!
//! Pure checks over membership snapshots. Handlers fetch the actor, the
//! target, and the active-owner count, run the guard, and only then touch
//! the store. Self-action checks run before last-owner checks; the error
//! a user sees for acting on themselves should not depend on how many
//! owners the org has.

use thiserror::Error;

use crate::orgs::model::{Membership, Role};

/// Rejection reasons for membership mutations. Messages are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Only owners can perform this action.")]
    NotOwner,
    #[error("Invalid role.")]
    InvalidRole,
    #[error("You cannot deactivate your own account in this organisation.")]
    SelfDeactivate,
    #[error("You cannot lower your own role.")]
    SelfDemote,
    #[error("You cannot deactivate the last Owner in this organisation.")]
    LastOwnerDeactivate,
    #[error("You cannot remove or demote the last Owner in this organisation.")]
    LastOwnerDemote,
}

/// Only owners pass.
pub fn ensure_owner(actor: &Membership) -> Result<(), GuardError> {
    if !actor.is_active || actor.role != Role::Owner {
        return Err(GuardError::NotOwner);
    }
    Ok(())
}

fn is_last_active_owner(target: &Membership, active_owner_count: usize) -> bool {
    target.role == Role::Owner && target.is_active && active_owner_count == 1
}

/// Check an activation toggle. `active_owner_count` is the number of
/// active owners in the target's org at the time of the check.
pub fn guard_toggle_active(
    actor: &Membership,
    target: &Membership,
    new_active: bool,
    active_owner_count: usize,
) -> Result<(), GuardError> {
    ensure_owner(actor)?;

    let self_action = actor.user_id == target.user_id;
    if self_action && !new_active {
        return Err(GuardError::SelfDeactivate);
    }

    if !new_active && is_last_active_owner(target, active_owner_count) {
        return Err(GuardError::LastOwnerDeactivate);
    }

    // Reactivations are always fine.
    Ok(())
}

/// Check a role change and parse the requested role.
pub fn guard_role_change(
    actor: &Membership,
    target: &Membership,
    new_role: &str,
    active_owner_count: usize,
) -> Result<Role, GuardError> {
    let new_role = Role::parse(new_role).ok_or(GuardError::InvalidRole)?;

    ensure_owner(actor)?;

    let self_action = actor.user_id == target.user_id;
    let lowering = new_role < target.role;

    if self_action && lowering {
        return Err(GuardError::SelfDemote);
    }

    if lowering && target.role == Role::Owner && is_last_active_owner(target, active_owner_count) {
        return Err(GuardError::LastOwnerDemote);
    }

    Ok(new_role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64, role: Role) -> Membership {
        Membership {
            id,
            user_id: id,
            org_id: 1,
            role,
            is_active: true,
            invited_by: None,
            invited_at: None,
            accepted_at: None,
        }
    }

    #[test]
    fn test_owner_can_promote_member() {
        let owner = member(1, Role::Owner);
        let alice = member(2, Role::Member);
        assert_eq!(guard_role_change(&owner, &alice, "admin", 1), Ok(Role::Admin));
    }

    #[test]
    fn test_non_owner_cannot_change_roles() {
        let admin = member(3, Role::Admin);
        let alice = member(2, Role::Member);
        assert_eq!(
            guard_role_change(&admin, &alice, "owner", 1),
            Err(GuardError::NotOwner)
        );
    }

    #[test]
    fn test_self_demote_blocked() {
        let owner = member(1, Role::Owner);
        // Two owners, so the last-owner rule does not apply; the
        // self-action rule must still fire.
        assert_eq!(
            guard_role_change(&owner, &owner, "admin", 2),
            Err(GuardError::SelfDemote)
        );
    }

    #[test]
    fn test_last_owner_cannot_be_demoted() {
        let owner = member(1, Role::Owner);
        let other_owner = member(2, Role::Owner);
        // Not a self action: one owner demoting another would be fine,
        // except the target is the only ACTIVE owner.
        let mut acting_owner = owner.clone();
        acting_owner.user_id = 9;
        assert_eq!(
            guard_role_change(&acting_owner, &other_owner, "member", 1),
            Err(GuardError::LastOwnerDemote)
        );
    }

    #[test]
    fn test_invalid_role_rejected_first() {
        let alice = member(2, Role::Member);
        // Even a non-owner actor sees InvalidRole for a junk role name.
        assert_eq!(
            guard_role_change(&alice, &alice, "root", 1),
            Err(GuardError::InvalidRole)
        );
    }

    #[test]
    fn test_toggle_active_blocks_last_owner_deactivation() {
        let owner = member(1, Role::Owner);
        assert_eq!(
            guard_toggle_active(&owner, &owner, false, 1),
            Err(GuardError::SelfDeactivate)
        );

        let other_owner = member(2, Role::Owner);
        assert_eq!(
            guard_toggle_active(&owner, &other_owner, false, 1),
            Err(GuardError::LastOwnerDeactivate)
        );
    }

    #[test]
    fn test_owner_can_deactivate_other_member() {
        let owner = member(1, Role::Owner);
        let alice = member(2, Role::Member);
        assert_eq!(guard_toggle_active(&owner, &alice, false, 1), Ok(()));
    }

    #[test]
    fn test_reactivation_always_allowed() {
        let owner = member(1, Role::Owner);
        let mut bob = member(3, Role::Admin);
        bob.is_active = false;
        assert_eq!(guard_toggle_active(&owner, &bob, true, 1), Ok(()));
    }

    #[test]
    fn test_inactive_owner_cannot_act() {
        let mut owner = member(1, Role::Owner);
        owner.is_active = false;
        let alice = member(2, Role::Member);
        assert_eq!(
            guard_toggle_active(&owner, &alice, false, 1),
            Err(GuardError::NotOwner)
        );
    }
}
