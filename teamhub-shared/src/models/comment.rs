/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author UUID REFERENCES team_members(id) ON DELETE SET NULL,
///     body TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The author reference is nullable so comments survive their author
/// leaving the team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment on a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Membership of the author (None if they left the team)
    pub author: Option<Uuid>,

    /// Comment text
    pub body: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        author: Uuid,
        body: &str,
    ) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author, body)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author, body, created_at
            "#,
        )
        .bind(task_id)
        .bind(author)
        .bind(body)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID, scoped to a task
    pub async fn find_in_task(
        pool: &PgPool,
        task_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author, body, created_at
            FROM comments
            WHERE id = $1 AND task_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists all comments on a task, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author, body, created_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Deletes a comment
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
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
    fn test_comment_serializes_nullable_author() {
        let comment = Comment {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            author: None,
            body: "left by a departed member".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&comment).unwrap();
        assert!(json["author"].is_null());
    }

    // Integration tests for database operations require a running database
}
