/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:id/tasks` - Tasks of a project
/// - `POST /v1/projects/:id/tasks` - Create a task
/// - `GET /v1/projects/:id/tasks/:task_id` - Task detail
/// - `PATCH /v1/projects/:id/tasks/:task_id` - Update a task
/// - `DELETE /v1/projects/:id/tasks/:task_id` - Delete a task
///
/// # Authorization
///
/// Any member of the project's team may create, edit, and delete tasks; no
/// admin flag is needed. The assignee, when set, must be a membership of
/// that same team, checked at write time because the schema alone can't
/// express it.

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
        project::Project,
        task::{CreateTask, Task, TaskStatus, UpdateTask},
        team_member::TeamMember,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Task description
    #[serde(default)]
    pub description: String,

    /// Initial status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Optional assignee (membership ID in the project's team)
    pub assigned_to: Option<Uuid>,
}

/// Task update request
///
/// `due_date` and `assigned_to` distinguish an explicit `null` (clear the
/// date, unassign) from an absent field (keep the current value).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New due date; `null` clears it
    #[serde(default, deserialize_with = "teamhub_shared::models::double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New assignee (membership ID in the project's team); `null` unassigns
    #[serde(default, deserialize_with = "teamhub_shared::models::double_option")]
    pub assigned_to: Option<Option<Uuid>>,
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

/// Rejects an assignee who isn't a member of the project's team
async fn validate_assignee(
    state: &AppState,
    project: &Project,
    assigned_to: Uuid,
) -> ApiResult<()> {
    let valid = TeamMember::find_by_id(&state.db, assigned_to)
        .await?
        .map(|m| m.team_id == project.team_id)
        .unwrap_or(false);

    if !valid {
        return Err(ApiError::invalid_field(
            "assigned_to",
            "Assignee must be a member of the project's team",
        ));
    }

    Ok(())
}

/// Lists a project's tasks (team members only)
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let (_project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;
    check(ActionKind::Safe, actor, ActionPolicy::task())?;

    let tasks = Task::list_by_project(&state.db, project_id).await?;
    Ok(Json(tasks))
}

/// Creates a task (any team member)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let (project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::task())?;

    let Actor::Member { id: member_id, .. } = actor else {
        return Err(ApiError::NotFound("Resource not found".to_string()));
    };

    if let Some(assigned_to) = req.assigned_to {
        validate_assignee(&state, &project, assigned_to).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id,
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Todo),
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            created_by: member_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Returns a task's details (team members only)
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Task>> {
    let (_project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;
    check(ActionKind::Safe, actor, ActionPolicy::task())?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(task))
}

/// Updates a task (any team member)
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let (project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::task())?;

    // Scope before mutation: a task ID under the wrong project is not found
    Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    // Only a concrete assignee needs validating; null just unassigns
    if let Some(Some(assigned_to)) = req.assigned_to {
        validate_assignee(&state, &project, assigned_to).await?;
    }

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a task (any team member); comments cascade away
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let (_project, actor) = resolve_project_actor(&state, project_id, auth.user_id).await?;
    check(ActionKind::Delete, actor, ActionPolicy::task())?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Task::delete(&state.db, task.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
