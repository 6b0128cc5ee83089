/// Project endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects` - Projects across all of the caller's teams
/// - `POST /v1/projects` - Create a project (team admins only)
/// - `GET /v1/projects/:id` - Project detail (team members only)
/// - `PATCH /v1/projects/:id` - Update, including moving to another team
/// - `DELETE /v1/projects/:id` - Delete (team admins only)
///
/// # Authorization
///
/// Project mutation is admin-only in the owning team. Moving a project to
/// another team is checked against BOTH teams: the caller must be an admin
/// of the source and of the destination.

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
use serde::Deserialize;
use teamhub_shared::{
    auth::{
        authz::{check, ActionKind, ActionPolicy, Actor},
        middleware::AuthContext,
    },
    models::{
        project::{CreateProject, Project, UpdateProject},
        team::Team,
        team_member::TeamMember,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Owning team
    pub team_id: Uuid,

    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Project description
    #[serde(default)]
    pub description: String,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Project update request
///
/// `deadline` distinguishes an explicit `null` (clear it) from an absent
/// field (keep the current value).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New deadline; `null` clears it
    #[serde(default, deserialize_with = "teamhub_shared::models::double_option")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    /// Destination team (moves the project)
    pub team_id: Option<Uuid>,
}

/// Resolves the caller's standing in a team, 404ing unknown teams
async fn team_actor(state: &AppState, team_id: Uuid, user_id: Uuid) -> ApiResult<Actor> {
    Team::find(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let membership = TeamMember::find_for_user(&state.db, team_id, user_id).await?;

    Ok(Actor::from_membership(membership.as_ref()))
}

/// Loads a project and the caller's standing in its team
async fn resolve_project_actor(
    state: &AppState,
    project_id: Uuid,
    user_id: Uuid,
) -> ApiResult<(Project, Actor)> {
    let project = Project::find(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let membership = TeamMember::find_for_user(&state.db, project.team_id, user_id).await?;

    Ok((project, Actor::from_membership(membership.as_ref())))
}

/// Lists projects across all teams the caller belongs to
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(projects))
}

/// Creates a project (team admins only)
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let actor = team_actor(&state, req.team_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::project())?;

    // check() guarantees the actor is a member here
    let Actor::Member { id: member_id, .. } = actor else {
        return Err(ApiError::NotFound("Resource not found".to_string()));
    };

    let project = Project::create(
        &state.db,
        CreateProject {
            team_id: req.team_id,
            name: req.name,
            description: req.description,
            deadline: req.deadline,
            created_by: member_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Returns a project's details (team members only)
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let (project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;

    check(ActionKind::Safe, actor, ActionPolicy::project())?;

    Ok(Json(project))
}

/// Updates a project (team admins only)
///
/// If `team_id` is present the project moves teams; the caller must pass
/// the same admin check against the destination team as well. Tasks keep
/// their assignees; an assignee who isn't a member of the new team shows up
/// as a dangling membership reference and should be reassigned.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let (project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::project())?;

    // Cross-team move: the destination team gets its own check
    if let Some(dest_team_id) = req.team_id {
        if dest_team_id != project.team_id {
            let dest_actor = team_actor(&state, dest_team_id, auth.user_id).await?;
            check(ActionKind::Write, dest_actor, ActionPolicy::project())?;
        }
    }

    let project = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            name: req.name,
            description: req.description,
            deadline: req.deadline,
            team_id: req.team_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(project))
}

/// Deletes a project (team admins only); tasks cascade away
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (_project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;

    check(ActionKind::Delete, actor, ActionPolicy::project())?;

    Project::delete(&state.db, project_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
