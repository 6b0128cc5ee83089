/// Team endpoints
///
/// # Endpoints
///
/// - `GET /v1/teams` - Teams the caller belongs to
/// - `POST /v1/teams` - Create a team (caller becomes its first admin)
/// - `GET /v1/teams/:id` - Team detail (members only)
/// - `PATCH /v1/teams/:id` - Update name/description/policies
/// - `DELETE /v1/teams/:id` - Delete the team (admins only)
///
/// # Authorization
///
/// Every team-scoped request resolves the caller's membership first. A
/// non-member gets 404 on all of these, so team IDs can't be probed. Who may
/// edit the name and description is governed by the team's own `public_edit`
/// policy; changing the policy fields themselves is always admin-only, and
/// an update mixing metadata and policy changes is rejected as a whole when
/// the caller isn't an admin.
///
/// The policy fields appear in responses only for admins.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamhub_shared::{
    auth::{
        authz::{check, ActionKind, ActionPolicy, Actor},
        middleware::AuthContext,
    },
    models::{
        team::{CreateTeam, EditPolicy, Team, UpdateTeam},
        team_member::TeamMember,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Team detail response
///
/// `public_edit` and `privacy_edit` are present only when the caller is an
/// admin of the team.
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    /// Team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Team description
    pub description: String,

    /// Who may edit name and description (admins only see this)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_edit: Option<EditPolicy>,

    /// Who may manage membership (admins only see this)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_edit: Option<EditPolicy>,

    /// When the team was created
    pub created_at: DateTime<Utc>,
}

impl TeamResponse {
    /// Builds a response, including the policy fields only for admins
    fn new(team: Team, viewer_is_admin: bool) -> Self {
        Self {
            id: team.id,
            name: team.name,
            description: team.description,
            public_edit: viewer_is_admin.then_some(team.public_edit),
            privacy_edit: viewer_is_admin.then_some(team.privacy_edit),
            created_at: team.created_at,
        }
    }
}

/// Entry in the team list
#[derive(Debug, Serialize)]
pub struct TeamSummary {
    /// Team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Team description
    pub description: String,

    /// When the team was created
    pub created_at: DateTime<Utc>,
}

/// Team creation request
///
/// The policy fields are not accepted here; a new team starts with both set
/// to `all` and an admin can tighten them afterwards.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Team description
    #[serde(default)]
    pub description: String,
}

/// Team update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New public-edit policy (admin only)
    pub public_edit: Option<EditPolicy>,

    /// New privacy-edit policy (admin only)
    pub privacy_edit: Option<EditPolicy>,
}

/// Resolves the caller's standing in a team
///
/// The team lookup and the membership lookup both feed the same 404: a
/// missing team and a team the caller doesn't belong to are
/// indistinguishable from outside.
async fn resolve_team_actor(
    state: &AppState,
    team_id: Uuid,
    user_id: Uuid,
) -> ApiResult<(Team, Actor)> {
    let team = Team::find(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let membership = TeamMember::find_for_user(&state.db, team_id, user_id).await?;

    Ok((team, Actor::from_membership(membership.as_ref())))
}

/// Lists the teams the caller belongs to
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TeamSummary>>> {
    let teams = Team::list_for_user(&state.db, auth.user_id).await?;

    let summaries = teams
        .into_iter()
        .map(|t| TeamSummary {
            id: t.id,
            name: t.name,
            description: t.description,
            created_at: t.created_at,
        })
        .collect();

    Ok(Json(summaries))
}

/// Creates a team
///
/// The caller is enrolled as the team's first admin in the same
/// transaction.
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    req.validate()?;

    let (team, _member) = Team::create_with_admin(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
        },
        auth.user_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::new(team, true))))
}

/// Returns a team's details (members only)
pub async fn get_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<TeamResponse>> {
    let (team, actor) = resolve_team_actor(&state, team_id, auth.user_id).await?;

    check(
        ActionKind::Safe,
        actor,
        ActionPolicy::team(team.public_edit),
    )?;

    let is_admin = matches!(actor, Actor::Member { is_admin: true, .. });
    Ok(Json(TeamResponse::new(team, is_admin)))
}

/// Updates a team
///
/// Name and description edits pass through the team's `public_edit` policy;
/// any change to the policy fields themselves additionally requires admin
/// rights, and the whole update is rejected if that check fails.
pub async fn update_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> ApiResult<Json<TeamResponse>> {
    req.validate()?;

    let (team, actor) = resolve_team_actor(&state, team_id, auth.user_id).await?;

    let update = UpdateTeam {
        name: req.name,
        description: req.description,
        public_edit: req.public_edit,
        privacy_edit: req.privacy_edit,
    };

    check(
        ActionKind::Write,
        actor,
        ActionPolicy::team(team.public_edit),
    )?;

    if update.touches_policy() {
        check(
            ActionKind::PolicyChange,
            actor,
            ActionPolicy::team(team.public_edit),
        )?;
    }

    let team = Team::update(&state.db, team_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let is_admin = matches!(actor, Actor::Member { is_admin: true, .. });
    Ok(Json(TeamResponse::new(team, is_admin)))
}

/// Deletes a team (admins only)
///
/// Memberships, projects, tasks, and comments are removed by the database's
/// cascade rules.
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (team, actor) = resolve_team_actor(&state, team_id, auth.user_id).await?;

    check(
        ActionKind::Delete,
        actor,
        ActionPolicy::team(team.public_edit),
    )?;

    Team::delete(&state.db, team_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
