/// Authorization engine
///
/// Pure decision functions for team-scoped permissions. Handlers load the
/// target entity, resolve the actor's membership in the owning team, and ask
/// this module whether the action is allowed. No I/O happens here; the
/// membership lookup is the caller's job.
///
/// # Permission model
///
/// Every mutating action is classified by an [`ActionKind`] and evaluated
/// against an [`ActionPolicy`] describing which of its kinds are admin-only
/// for the target resource:
///
/// | Resource          | Write requires admin          | Delete requires admin |
/// |-------------------|-------------------------------|-----------------------|
/// | Team metadata     | only if `public_edit = admin` | always                |
/// | Team membership   | always                        | always                |
/// | Project           | always                        | always                |
/// | Task / Comment    | never                         | never                 |
///
/// Policy-field changes (`public_edit`/`privacy_edit` themselves) are
/// admin-only regardless of the current `public_edit` value. Reads are
/// allowed for any member. A non-member is rejected with
/// [`AuthzError::NotAMember`] for every action, which callers surface as
/// "not found" so the resource's existence isn't leaked.
///
/// Two failure kinds are deliberately distinct end-to-end:
/// [`AuthzError::NotAMember`] (no membership at all) vs.
/// [`AuthzError::InsufficientRole`] (member, but the policy demands admin).
///
/// # Example
///
/// ```
/// use teamhub_shared::auth::authz::{check, Actor, ActionKind, ActionPolicy, AuthzError};
/// use teamhub_shared::models::team::EditPolicy;
/// use uuid::Uuid;
///
/// let member = Actor::Member { id: Uuid::new_v4(), is_admin: false };
///
/// // Non-admin may rename a team whose public_edit is "all"...
/// assert!(check(ActionKind::Write, member, ActionPolicy::team(EditPolicy::All)).is_ok());
///
/// // ...but never delete it.
/// assert_eq!(
///     check(ActionKind::Delete, member, ActionPolicy::team(EditPolicy::All)),
///     Err(AuthzError::InsufficientRole)
/// );
/// ```

use uuid::Uuid;

use crate::models::team::EditPolicy;
use crate::models::team_member::TeamMember;

/// Authorization failure kinds
///
/// Callers map `NotAMember` to 404 and `InsufficientRole` to 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Actor has no membership record in the relevant team
    #[error("not a member of the target team")]
    NotAMember,

    /// Actor is a member but lacks the required role
    #[error("insufficient role for this action")]
    InsufficientRole,
}

/// Classification of the requested action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Read-only access (GET and friends)
    Safe,

    /// Mutation of ordinary fields
    Write,

    /// Removal of the resource
    Delete,

    /// Change of the team's policy fields themselves
    PolicyChange,
}

/// The actor as seen by the engine: a membership snapshot, or its absence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// No membership record in the relevant team
    NotAMember,

    /// A member of the relevant team
    Member {
        /// Membership ID (used for self-removal checks)
        id: Uuid,

        /// Whether the member is a team admin
        is_admin: bool,
    },
}

impl Actor {
    /// Builds an actor from the result of a membership lookup
    pub fn from_membership(membership: Option<&TeamMember>) -> Self {
        match membership {
            Some(m) => Actor::Member {
                id: m.id,
                is_admin: m.is_admin,
            },
            None => Actor::NotAMember,
        }
    }
}

/// Which action kinds are admin-gated for a given resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPolicy {
    /// Whether `Write` requires the admin flag
    pub write_requires_admin: bool,

    /// Whether `Delete` requires the admin flag
    pub delete_requires_admin: bool,
}

impl ActionPolicy {
    /// Policy for team name/description edits
    ///
    /// Writes follow the team's `public_edit` setting. Deletion is
    /// admin-only unconditionally; `privacy_edit` is not consulted here,
    /// matching the original behavior (see DESIGN.md open questions).
    pub fn team(public_edit: EditPolicy) -> Self {
        Self {
            write_requires_admin: public_edit == EditPolicy::Admin,
            delete_requires_admin: true,
        }
    }

    /// Policy for membership management (add, edit roles, list roster)
    pub fn membership() -> Self {
        Self {
            write_requires_admin: true,
            delete_requires_admin: true,
        }
    }

    /// Policy for projects
    pub fn project() -> Self {
        Self {
            write_requires_admin: true,
            delete_requires_admin: true,
        }
    }

    /// Policy for tasks and comments: any member may mutate
    pub fn task() -> Self {
        Self {
            write_requires_admin: false,
            delete_requires_admin: false,
        }
    }
}

/// Evaluates whether `actor` may perform `action` under `policy`
///
/// Stateless; every request evaluates fresh. Decisions are never cached.
pub fn check(action: ActionKind, actor: Actor, policy: ActionPolicy) -> Result<(), AuthzError> {
    let is_admin = match actor {
        Actor::NotAMember => return Err(AuthzError::NotAMember),
        Actor::Member { is_admin, .. } => is_admin,
    };

    let allowed = match action {
        ActionKind::Safe => true,
        ActionKind::Write => is_admin || !policy.write_requires_admin,
        ActionKind::Delete => is_admin || !policy.delete_requires_admin,
        ActionKind::PolicyChange => is_admin,
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole)
    }
}

/// Evaluates a membership removal
///
/// Admins may remove anyone. A member may always remove their own
/// membership (leave the team), bypassing `privacy_edit`. Anyone else gets
/// `InsufficientRole`; outsiders get `NotAMember`.
pub fn check_member_removal(actor: Actor, target_member_id: Uuid) -> Result<(), AuthzError> {
    match actor {
        Actor::NotAMember => Err(AuthzError::NotAMember),
        Actor::Member { is_admin: true, .. } => Ok(()),
        Actor::Member { id, .. } if id == target_member_id => Ok(()),
        Actor::Member { .. } => Err(AuthzError::InsufficientRole),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::Member {
            id: Uuid::new_v4(),
            is_admin: true,
        }
    }

    fn member() -> Actor {
        Actor::Member {
            id: Uuid::new_v4(),
            is_admin: false,
        }
    }

    #[test]
    fn test_non_member_rejected_for_every_action() {
        for policy in [
            ActionPolicy::team(EditPolicy::All),
            ActionPolicy::team(EditPolicy::Admin),
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
                assert_eq!(
                    check(action, Actor::NotAMember, policy),
                    Err(AuthzError::NotAMember)
                );
            }
        }
    }

    #[test]
    fn test_safe_actions_allowed_for_any_member() {
        assert!(check(ActionKind::Safe, member(), ActionPolicy::team(EditPolicy::Admin)).is_ok());
        assert!(check(ActionKind::Safe, member(), ActionPolicy::project()).is_ok());
        assert!(check(ActionKind::Safe, admin(), ActionPolicy::membership()).is_ok());
    }

    #[test]
    fn test_team_edit_follows_public_edit() {
        // public_edit = admin: only admins may write
        let locked = ActionPolicy::team(EditPolicy::Admin);
        assert_eq!(
            check(ActionKind::Write, member(), locked),
            Err(AuthzError::InsufficientRole)
        );
        assert!(check(ActionKind::Write, admin(), locked).is_ok());

        // public_edit = all: every member may write
        let open = ActionPolicy::team(EditPolicy::All);
        assert!(check(ActionKind::Write, member(), open).is_ok());
        assert!(check(ActionKind::Write, admin(), open).is_ok());
    }

    #[test]
    fn test_policy_change_is_admin_only_even_when_open() {
        let open = ActionPolicy::team(EditPolicy::All);
        assert_eq!(
            check(ActionKind::PolicyChange, member(), open),
            Err(AuthzError::InsufficientRole)
        );
        assert!(check(ActionKind::PolicyChange, admin(), open).is_ok());
    }

    #[test]
    fn test_team_delete_is_admin_only_regardless_of_policies() {
        for public_edit in [EditPolicy::All, EditPolicy::Admin] {
            let policy = ActionPolicy::team(public_edit);
            assert_eq!(
                check(ActionKind::Delete, member(), policy),
                Err(AuthzError::InsufficientRole)
            );
            assert!(check(ActionKind::Delete, admin(), policy).is_ok());
        }
    }

    #[test]
    fn test_membership_and_project_mutation_admin_only() {
        for policy in [ActionPolicy::membership(), ActionPolicy::project()] {
            assert_eq!(
                check(ActionKind::Write, member(), policy),
                Err(AuthzError::InsufficientRole)
            );
            assert_eq!(
                check(ActionKind::Delete, member(), policy),
                Err(AuthzError::InsufficientRole)
            );
            assert!(check(ActionKind::Write, admin(), policy).is_ok());
            assert!(check(ActionKind::Delete, admin(), policy).is_ok());
        }
    }

    #[test]
    fn test_any_member_may_mutate_tasks() {
        let policy = ActionPolicy::task();
        assert!(check(ActionKind::Write, member(), policy).is_ok());
        assert!(check(ActionKind::Delete, member(), policy).is_ok());
        assert!(check(ActionKind::Write, admin(), policy).is_ok());
    }

    #[test]
    fn test_member_removal_rules() {
        let target = Uuid::new_v4();

        // Admin removes anyone
        assert!(check_member_removal(admin(), target).is_ok());

        // A member removes themself
        let self_actor = Actor::Member {
            id: target,
            is_admin: false,
        };
        assert!(check_member_removal(self_actor, target).is_ok());

        // A non-admin removing someone else is refused
        assert_eq!(
            check_member_removal(member(), target),
            Err(AuthzError::InsufficientRole)
        );

        // Outsiders don't get to know the membership exists
        assert_eq!(
            check_member_removal(Actor::NotAMember, target),
            Err(AuthzError::NotAMember)
        );
    }

    #[test]
    fn test_actor_from_membership() {
        use chrono::Utc;

        let row = TeamMember {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            is_admin: true,
            created_at: Utc::now(),
        };

        assert_eq!(
            Actor::from_membership(Some(&row)),
            Actor::Member {
                id: row.id,
                is_admin: true
            }
        );
        assert_eq!(Actor::from_membership(None), Actor::NotAMember);
    }
}
