/// Team membership endpoints
///
/// # Endpoints
///
/// - `GET /v1/teams/:id/members` - Roster with profile fields (admins only)
/// - `POST /v1/teams/:id/members` - Add members by email, batch (admins only)
/// - `PATCH /v1/teams/:id/members` - Change admin flags, batch (admins only)
/// - `DELETE /v1/teams/:id/members/:member_id` - Remove a member
///
/// # Authorization
///
/// Membership management is admin-only throughout, with one exception:
/// any member may delete their own membership (leave the team).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use teamhub_shared::{
    auth::{
        authz::{check, check_member_removal, ActionKind, ActionPolicy, Actor},
        middleware::AuthContext,
    },
    models::{
        team::Team,
        team_member::{TeamMember, TeamMemberProfile},
        user::User,
    },
};
use uuid::Uuid;

/// One member to add, identified by email
#[derive(Debug, Deserialize)]
pub struct AddMemberEntry {
    /// Email of an existing user account
    pub email: String,

    /// Whether to grant the admin flag immediately
    #[serde(default)]
    pub is_admin: bool,
}

/// Batch add request
#[derive(Debug, Deserialize)]
pub struct AddMembersRequest {
    /// Members to add
    pub members: Vec<AddMemberEntry>,
}

/// One role change
#[derive(Debug, Deserialize)]
pub struct UpdateMemberEntry {
    /// Membership ID (must belong to this team)
    pub id: Uuid,

    /// New admin flag
    pub is_admin: bool,
}

/// Batch role change request
#[derive(Debug, Deserialize)]
pub struct UpdateMembersRequest {
    /// Role changes to apply
    pub members: Vec<UpdateMemberEntry>,
}

/// Batch add response
#[derive(Debug, Serialize)]
pub struct AddMembersResponse {
    /// Memberships created by this request
    pub added: Vec<TeamMember>,

    /// Emails that were already members and were skipped
    pub skipped: Vec<String>,
}

/// Resolves the caller's standing in a team, 404ing unknown teams
async fn resolve_actor(
    state: &AppState,
    team_id: Uuid,
    user_id: Uuid,
) -> ApiResult<Actor> {
    Team::find(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let membership = TeamMember::find_for_user(&state.db, team_id, user_id).await?;

    Ok(Actor::from_membership(membership.as_ref()))
}

/// Lists the team roster (admins only)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TeamMemberProfile>>> {
    let actor = resolve_actor(&state, team_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::membership())?;

    let members = TeamMember::list_by_team(&state.db, team_id).await?;
    Ok(Json(members))
}

/// Adds members by email, in batch (admins only)
///
/// Emails already on the roster are skipped and reported back. Emails with
/// no matching account fail the whole request with 422 so a typo doesn't
/// silently add half a list.
pub async fn add_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<AddMembersRequest>,
) -> ApiResult<(StatusCode, Json<AddMembersResponse>)> {
    let actor = resolve_actor(&state, team_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::membership())?;

    if req.members.is_empty() {
        return Err(ApiError::invalid_field("members", "List must not be empty"));
    }

    // Resolve every email before touching the roster
    let mut resolved = Vec::with_capacity(req.members.len());
    let mut unknown = Vec::new();

    for entry in &req.members {
        match User::find_by_email(&state.db, &entry.email).await? {
            Some(user) => resolved.push((user, entry.is_admin, entry.email.clone())),
            None => unknown.push(ValidationErrorDetail {
                field: "members".to_string(),
                message: format!("No account with email {}", entry.email),
            }),
        }
    }

    if !unknown.is_empty() {
        return Err(ApiError::ValidationError(unknown));
    }

    let mut added = Vec::new();
    let mut skipped = Vec::new();

    for (user, is_admin, email) in resolved {
        if TeamMember::exists(&state.db, team_id, user.id).await? {
            skipped.push(email);
            continue;
        }

        let member = TeamMember::create(&state.db, team_id, user.id, is_admin).await?;
        added.push(member);
    }

    Ok((
        StatusCode::CREATED,
        Json(AddMembersResponse { added, skipped }),
    ))
}

/// Changes admin flags, in batch (admins only)
///
/// Every ID must be a membership of this team; an ID belonging to another
/// team fails the whole request with 422.
pub async fn update_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<UpdateMembersRequest>,
) -> ApiResult<Json<Vec<TeamMember>>> {
    let actor = resolve_actor(&state, team_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::membership())?;

    if req.members.is_empty() {
        return Err(ApiError::invalid_field("members", "List must not be empty"));
    }

    // Verify scope before applying anything
    for entry in &req.members {
        if TeamMember::find_in_team(&state.db, team_id, entry.id)
            .await?
            .is_none()
        {
            return Err(ApiError::invalid_field(
                "members",
                format!("No membership {} in this team", entry.id),
            ));
        }
    }

    let mut updated = Vec::with_capacity(req.members.len());
    for entry in &req.members {
        if let Some(member) = TeamMember::set_admin(&state.db, entry.id, entry.is_admin).await? {
            updated.push(member);
        }
    }

    Ok(Json(updated))
}

/// Removes a member
///
/// Admins may remove anyone; a member may remove themself (leave the team).
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let actor = resolve_actor(&state, team_id, auth.user_id).await?;

    // Out-of-team membership IDs read as not found
    let target = TeamMember::find_in_team(&state.db, team_id, member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    check_member_removal(actor, target.id)?;

    TeamMember::delete(&state.db, target.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
