/// Task model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'todo',
///     due_date TIMESTAMPTZ,
///     assigned_to UUID REFERENCES team_members(id) ON DELETE SET NULL,
///     created_by UUID NOT NULL REFERENCES team_members(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `assigned_to` must reference a member of the task's project's team. That
/// is a cross-table invariant the database can't express, so it is enforced
/// at write time by the handlers before calling `create`/`update`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts the status to a string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Lifecycle status
    pub status: TaskStatus,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Membership of the assignee (None if unassigned, or if the assignee
    /// left the team)
    pub assigned_to: Option<Uuid>,

    /// Membership of the creator
    pub created_by: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning project
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Initial status
    pub status: TaskStatus,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Optional assignee (already validated to belong to the project's team)
    pub assigned_to: Option<Uuid>,

    /// Membership of the creator
    pub created_by: Uuid,
}

/// Input for updating a task
///
/// Only fields present in the request change. `due_date` and `assigned_to`
/// are nullable columns, so for them an explicit `null` (clear / unassign)
/// must stay distinguishable from an absent field; hence the double
/// `Option`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New due date; `Some(None)` clears it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New assignee; `Some(None)` unassigns. A concrete assignee must have
    /// been validated to belong to the project's team.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub assigned_to: Option<Option<Uuid>>,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, status, due_date, assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, project_id, title, description, status, due_date,
                      assigned_to, created_by, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to a project
    ///
    /// Returns None if the task exists under a different project, so a task
    /// ID pasted under the wrong project URL reads as not found.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, due_date,
                   assigned_to, created_by, created_at
            FROM tasks
            WHERE id = $1 AND project_id = $2
            "#,
        )
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks of a project
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, due_date,
                   assigned_to, created_by, created_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update
    ///
    /// Returns the updated task, or None if it doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                due_date = CASE WHEN $5 THEN $6 ELSE due_date END,
                assigned_to = CASE WHEN $7 THEN $8 ELSE assigned_to END
            WHERE id = $1
            RETURNING id, project_id, title, description, status, due_date,
                      assigned_to, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.due_date.is_some())
        .bind(data.due_date.flatten())
        .bind(data.assigned_to.is_some())
        .bind(data.assigned_to.flatten())
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task; comments cascade away at the database level
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_task_status_serde() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"done\"").unwrap(),
            TaskStatus::Done
        );
    }

    #[test]
    fn test_update_task_partial_deserialize() {
        let update: UpdateTask = serde_json::from_str("{\"status\":\"done\"}").unwrap();
        assert_eq!(update.status, Some(TaskStatus::Done));
        assert!(update.title.is_none());
        assert!(update.assigned_to.is_none());
        assert!(update.due_date.is_none());
    }

    #[test]
    fn test_update_task_null_is_not_absent() {
        // Explicit nulls unassign and clear; an empty patch changes nothing
        let update: UpdateTask =
            serde_json::from_str("{\"assigned_to\":null,\"due_date\":null}").unwrap();
        assert_eq!(update.assigned_to, Some(None));
        assert_eq!(update.due_date, Some(None));

        let update: UpdateTask = serde_json::from_str("{}").unwrap();
        assert_eq!(update.assigned_to, None);
        assert_eq!(update.due_date, None);
    }

    #[test]
    fn test_update_task_concrete_assignee_round_trips() {
        let member_id = Uuid::new_v4();
        let json = format!("{{\"assigned_to\":\"{}\"}}", member_id);
        let update: UpdateTask = serde_json::from_str(&json).unwrap();
        assert_eq!(update.assigned_to, Some(Some(member_id)));
    }

    // Integration tests for database operations require a running database
}
