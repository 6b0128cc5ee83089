/// Task comment endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:id/tasks/:task_id/comments` - List comments
/// - `POST /v1/projects/:id/tasks/:task_id/comments` - Add a comment
/// - `DELETE /v1/projects/:id/tasks/:task_id/comments/:comment_id` - Remove one
///
/// # Authorization
///
/// Any member of the project's team may read and write comments. Deletion
/// is restricted to the comment's author or a team admin.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamhub_shared::{
    auth::{
        authz::{check, ActionKind, ActionPolicy, Actor},
        middleware::AuthContext,
    },
    models::{comment::Comment, project::Project, task::Task, team_member::TeamMember},
};
use uuid::Uuid;
use validator::Validate;

/// Comment creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Comment text
    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: String,
}

/// Loads a task (scoped to its project) and the caller's standing
async fn resolve_task_actor(
    state: &AppState,
    project_id: Uuid,
    task_id: Uuid,
    user_id: Uuid,
) -> ApiResult<(Task, Actor)> {
    let project = Project::find(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let membership = TeamMember::find_for_user(&state.db, project.team_id, user_id).await?;

    Ok((task, Actor::from_membership(membership.as_ref())))
}

/// Lists a task's comments, oldest first (team members only)
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Comment>>> {
    let (task, actor) = resolve_task_actor(&state, project_id, task_id, auth.user_id).await?;
    check(ActionKind::Safe, actor, ActionPolicy::task())?;

    let comments = Comment::list_by_task(&state.db, task.id).await?;
    Ok(Json(comments))
}

/// Adds a comment (any team member)
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;

    let (task, actor) = resolve_task_actor(&state, project_id, task_id, auth.user_id).await?;
    check(ActionKind::Write, actor, ActionPolicy::task())?;

    let Actor::Member { id: member_id, .. } = actor else {
        return Err(ApiError::NotFound("Resource not found".to_string()));
    };

    let comment = Comment::create(&state.db, task.id, member_id, &req.body).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Deletes a comment (its author, or a team admin)
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let (task, actor) = resolve_task_actor(&state, project_id, task_id, auth.user_id).await?;

    let comment = Comment::find_in_task(&state.db, task.id, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let allowed = match actor {
        Actor::NotAMember => {
            return Err(ApiError::NotFound("Resource not found".to_string()));
        }
        Actor::Member { is_admin: true, .. } => true,
        Actor::Member { id, .. } => comment.author == Some(id),
    };

    if !allowed {
        return Err(ApiError::Forbidden("Insufficient permissions".to_string()));
    }

    Comment::delete(&state.db, comment.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
