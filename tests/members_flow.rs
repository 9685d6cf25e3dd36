//! Membership and invitation flows, end to end.

use std::net::SocketAddr;

use console_sdk::ConsoleClient;

mod common;

#[tokio::test]
async fn test_invite_accept_and_role_guards() {
    let addr: SocketAddr = "127.0.0.1:28381".parse().unwrap();
    let config = common::test_config(&[("owner", "x"), ("alice", "x"), ("bob", "x")]);
    let (shutdown, state) = common::start_console(addr, config).await;
    let base = format!("http://{}", addr);

    // Owner signs in and creates an org.
    let owner = ConsoleClient::new(&base);
    owner.login("owner", "x").await.expect("owner login");
    let org_id = owner.create_org("Test Org", "integration").await.unwrap();
    assert!(org_id > 0);

    let panel = owner.members_block(org_id).await.unwrap();
    assert!(panel.contains("Members of Test Org"));
    assert!(panel.contains("owner"));

    // Owner invites alice; the invitation shows up in the panel.
    let panel = owner
        .create_invite(org_id, "alice@example.com", "member")
        .await
        .unwrap();
    assert!(panel.contains("Invitation sent to alice@example.com."));
    assert!(panel.contains("PENDING"));

    // Alice accepts through the token (read from the store, the way the
    // email link would carry it).
    let invite = state
        .store
        .open_invites_for_org(org_id)
        .into_iter()
        .next()
        .expect("invite stored");
    let alice = ConsoleClient::new(&base);
    alice.login("alice", "x").await.expect("alice login");
    let after_accept = alice.accept_invite(&invite.token).await.unwrap();
    assert!(after_accept.contains("Members of Test Org"));

    let membership = state
        .store
        .membership_of(org_id, state.store.user_by_name("alice").unwrap().id)
        .expect("alice joined");
    assert!(membership.is_active);

    // A member cannot invite; the panel comes back with an inline error
    // and no invite is created.
    let invites_before = state.store.open_invites_for_org(org_id).len();
    let panel = alice
        .create_invite(org_id, "nope@example.com", "member")
        .await
        .unwrap();
    assert!(panel.contains("Only admins can invite members."));
    assert_eq!(state.store.open_invites_for_org(org_id).len(), invites_before);

    // Owner promotes alice to admin.
    let panel = owner
        .update_member_role(org_id, membership.id, "admin")
        .await
        .unwrap();
    assert!(panel.contains("Role updated."));

    // An admin still cannot change roles; only owners pass the guard.
    let owner_membership = state
        .store
        .membership_of(org_id, state.store.user_by_name("owner").unwrap().id)
        .unwrap();
    let panel = alice
        .update_member_role(org_id, owner_membership.id, "member")
        .await
        .unwrap();
    assert!(panel.contains("Only owners can perform this action."));

    // The last owner cannot demote or deactivate themselves.
    let panel = owner
        .update_member_role(org_id, owner_membership.id, "member")
        .await
        .unwrap();
    assert!(panel.contains("You cannot lower your own role."));

    let panel = owner
        .toggle_member(org_id, owner_membership.id, false)
        .await
        .unwrap();
    assert!(panel.contains("You cannot deactivate your own account"));

    // Deactivating a regular member works and survives in the store.
    let panel = owner
        .toggle_member(org_id, membership.id, false)
        .await
        .unwrap();
    assert!(panel.contains("Member updated."));
    assert!(!state.store.membership(membership.id).unwrap().is_active);

    shutdown.trigger();
}

#[tokio::test]
async fn test_access_control() {
    let addr: SocketAddr = "127.0.0.1:28382".parse().unwrap();
    let config = common::test_config(&[("owner", "x"), ("mallory", "x")]);
    let (shutdown, _state) = common::start_console(addr, config).await;
    let base = format!("http://{}", addr);

    let owner = ConsoleClient::new(&base);
    owner.login("owner", "x").await.unwrap();
    let org_id = owner.create_org("Private Org", "").await.unwrap();

    // Unauthenticated requests get 401.
    let anonymous = ConsoleClient::new(&base);
    let err = anonymous.members_block(org_id).await.unwrap_err();
    assert!(err.to_string().contains("401"));

    // A signed-in non-member gets 403.
    let mallory = ConsoleClient::new(&base);
    mallory.login("mallory", "x").await.unwrap();
    let err = mallory.members_block(org_id).await.unwrap_err();
    assert!(err.to_string().contains("403"));
    assert!(err
        .to_string()
        .contains("You don't have access to this organisation."));

    // Wrong password is rejected outright.
    let intruder = ConsoleClient::new(&base);
    assert!(intruder.login("owner", "wrong").await.is_err());

    shutdown.trigger();
}
