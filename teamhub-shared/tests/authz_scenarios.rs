//! End-to-end walkthroughs of the authorization rules, using the pure
//! engine with hand-built membership snapshots. Database-backed variants of
//! these flows live with the API integration tests.

use teamhub_shared::auth::authz::{
    check, check_member_removal, ActionKind, ActionPolicy, Actor, AuthzError,
};
use teamhub_shared::models::team::EditPolicy;
use uuid::Uuid;

struct Roster {
    admin: Actor,
    member: Actor,
    member_id: Uuid,
}

/// A freshly created team: the creator is the sole admin, one non-admin
/// member added later.
fn roster() -> Roster {
    let member_id = Uuid::new_v4();
    Roster {
        admin: Actor::Member {
            id: Uuid::new_v4(),
            is_admin: true,
        },
        member: Actor::Member {
            id: member_id,
            is_admin: false,
        },
        member_id,
    }
}

#[test]
fn locked_team_metadata_is_admin_only() {
    // Team created with public_edit=admin, privacy_edit=all
    let r = roster();
    let policy = ActionPolicy::team(EditPolicy::Admin);

    // The added member cannot patch the description
    assert_eq!(
        check(ActionKind::Write, r.member, policy),
        Err(AuthzError::InsufficientRole)
    );

    // The creator can
    assert!(check(ActionKind::Write, r.admin, policy).is_ok());

    // Both can still read it
    assert!(check(ActionKind::Safe, r.member, policy).is_ok());
    assert!(check(ActionKind::Safe, r.admin, policy).is_ok());
}

#[test]
fn open_team_still_guards_its_policy_fields() {
    let r = roster();
    let policy = ActionPolicy::team(EditPolicy::All);

    // Metadata is open to everyone
    assert!(check(ActionKind::Write, r.member, policy).is_ok());

    // But flipping public_edit/privacy_edit themselves stays admin-only,
    // and the whole update must fail rather than apply partially
    assert_eq!(
        check(ActionKind::PolicyChange, r.member, policy),
        Err(AuthzError::InsufficientRole)
    );
    assert!(check(ActionKind::PolicyChange, r.admin, policy).is_ok());
}

#[test]
fn outsiders_learn_nothing() {
    for policy in [
        ActionPolicy::team(EditPolicy::All),
        ActionPolicy::membership(),
        ActionPolicy::project(),
        ActionPolicy::task(),
    ] {
        for action in [
            ActionKind::Safe,
            ActionKind::Write,
            ActionKind::Delete,
            ActionKind::PolicyChange,
        ] {
            // NotAMember, never InsufficientRole: the caller maps this to
            // 404 so a non-member can't probe for existence
            assert_eq!(
                check(action, Actor::NotAMember, policy),
                Err(AuthzError::NotAMember)
            );
        }
    }
}

#[test]
fn leaving_a_team_needs_no_permission() {
    let r = roster();

    // An admin removes the member
    assert!(check_member_removal(r.admin, r.member_id).is_ok());

    // The member leaves on their own
    assert!(check_member_removal(r.member, r.member_id).is_ok());

    // The member cannot remove a third party
    let other = Uuid::new_v4();
    assert_eq!(
        check_member_removal(r.member, other),
        Err(AuthzError::InsufficientRole)
    );
}

#[test]
fn project_mutation_is_admin_scoped_per_team() {
    let r = roster();
    let policy = ActionPolicy::project();

    assert!(check(ActionKind::Write, r.admin, policy).is_ok());
    assert_eq!(
        check(ActionKind::Write, r.member, policy),
        Err(AuthzError::InsufficientRole)
    );

    // Moving a project means passing the same check against the
    // destination team's membership too; an admin of only the source team
    // shows up as NotAMember there
    assert_eq!(
        check(ActionKind::Write, Actor::NotAMember, policy),
        Err(AuthzError::NotAMember)
    );
}

#[test]
fn any_member_works_tasks() {
    let r = roster();
    let policy = ActionPolicy::task();

    for actor in [r.admin, r.member] {
        assert!(check(ActionKind::Write, actor, policy).is_ok());
        assert!(check(ActionKind::Delete, actor, policy).is_ok());
    }
}
