/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     deadline TIMESTAMPTZ,
///     created_by UUID REFERENCES team_members(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// A project belongs to exactly one team. `created_by` is nullable so the
/// project survives its creator leaving the team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Owning team
    pub team_id: Uuid,

    /// Project name
    pub name: String,

    /// Project description
    pub description: String,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Membership of the creator (None if they left the team)
    pub created_by: Option<Uuid>,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Owning team
    pub team_id: Uuid,

    /// Project name
    pub name: String,

    /// Project description
    pub description: String,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Membership of the creator
    pub created_by: Uuid,
}

/// Input for updating a project
///
/// A `team_id` here moves the project to another team; the caller must have
/// verified admin rights in both the source and destination teams first.
/// `deadline` is nullable, so an explicit `null` (clear the deadline) must
/// stay distinguishable from an absent field; hence the double `Option`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New deadline; `Some(None)` clears it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    /// Destination team (project move)
    pub team_id: Option<Uuid>,
}

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (team_id, name, description, deadline, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, name, description, deadline, created_by, created_at
            "#,
        )
        .bind(data.team_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.deadline)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, team_id, name, description, deadline, created_by, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects across all teams the user belongs to
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.team_id, p.name, p.description, p.deadline, p.created_by, p.created_at
            FROM projects p
            JOIN team_members m ON m.team_id = p.team_id
            WHERE m.user_id = $1
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Applies a partial update
    ///
    /// Returns the updated project, or None if it doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                deadline = CASE WHEN $4 THEN $5 ELSE deadline END,
                team_id = COALESCE($6, team_id)
            WHERE id = $1
            RETURNING id, team_id, name, description, deadline, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.deadline.is_some())
        .bind(data.deadline.flatten())
        .bind(data.team_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project; its tasks cascade away at the database level
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
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
    fn test_update_project_deserializes_move() {
        let team_id = Uuid::new_v4();
        let json = format!("{{\"name\":\"renamed\",\"team_id\":\"{}\"}}", team_id);
        let update: UpdateProject = serde_json::from_str(&json).unwrap();

        assert_eq!(update.name.as_deref(), Some("renamed"));
        assert_eq!(update.team_id, Some(team_id));
        assert!(update.description.is_none());
        assert!(update.deadline.is_none());
    }

    #[test]
    fn test_update_project_null_deadline_clears() {
        let update: UpdateProject = serde_json::from_str("{\"deadline\":null}").unwrap();
        assert_eq!(update.deadline, Some(None));

        let update: UpdateProject = serde_json::from_str("{}").unwrap();
        assert_eq!(update.deadline, None);
    }

    // Integration tests for database operations require a running database
}
