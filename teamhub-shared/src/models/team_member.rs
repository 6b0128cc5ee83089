/// Team membership model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE team_members (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, team_id)
/// );
/// ```
///
/// A user belongs to a team at most once; the database enforces the
/// `(user_id, team_id)` uniqueness. Projects and tasks reference rows of
/// this table (not users directly), so removing a membership nulls out task
/// assignments via `ON DELETE SET NULL`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership row linking a user to a team
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    /// Membership ID
    pub id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Team ID
    pub team_id: Uuid,

    /// Whether this member is a team admin
    pub is_admin: bool,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Membership joined with the user's profile fields, for roster listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamMemberProfile {
    /// Membership ID
    pub id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// User email
    pub email: String,

    /// Username
    pub username: String,

    /// First name
    pub first_name: Option<String>,

    /// Last name
    pub last_name: Option<String>,

    /// Whether this member is a team admin
    pub is_admin: bool,
}

impl TeamMember {
    /// Adds a user to a team
    ///
    /// # Errors
    ///
    /// Returns an error if the user is already a member (unique constraint)
    /// or the user/team doesn't exist (foreign key violation).
    pub async fn create(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (user_id, team_id, is_admin)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, team_id, is_admin, created_at
            "#,
        )
        .bind(user_id)
        .bind(team_id)
        .bind(is_admin)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds the membership of a given user in a given team
    ///
    /// This is the lookup every authorization check starts from: None means
    /// the actor is not a member of the team.
    pub async fn find_for_user(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id, user_id, team_id, is_admin, created_at
            FROM team_members
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Finds a membership by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id, user_id, team_id, is_admin, created_at
            FROM team_members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Finds a membership by ID, scoped to a team
    ///
    /// Returns None if the membership exists but belongs to a different
    /// team, so handlers can treat out-of-team IDs as not found.
    pub async fn find_in_team(
        pool: &PgPool,
        team_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id, user_id, team_id, is_admin, created_at
            FROM team_members
            WHERE id = $1 AND team_id = $2
            "#,
        )
        .bind(member_id)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Checks whether a user is a member of a team
    pub async fn exists(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM team_members
                WHERE team_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the roster of a team with user profile fields
    pub async fn list_by_team(
        pool: &PgPool,
        team_id: Uuid,
    ) -> Result<Vec<TeamMemberProfile>, sqlx::Error> {
        let members = sqlx::query_as::<_, TeamMemberProfile>(
            r#"
            SELECT m.id, m.user_id, u.email, u.username, u.first_name, u.last_name, m.is_admin
            FROM team_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.team_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Sets the admin flag on a membership
    ///
    /// Returns the updated membership, or None if it doesn't exist.
    pub async fn set_admin(
        pool: &PgPool,
        id: Uuid,
        is_admin: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members
            SET is_admin = $2
            WHERE id = $1
            RETURNING id, user_id, team_id, is_admin, created_at
            "#,
        )
        .bind(id)
        .bind(is_admin)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Removes a membership
    ///
    /// Tasks assigned to the departing member keep existing with
    /// `assigned_to` nulled; tasks they created are removed, both per the
    /// schema's referential rules.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE id = $1")
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
    fn test_member_serializes_admin_flag() {
        let member = TeamMember {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            is_admin: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["is_admin"], serde_json::Value::Bool(true));
    }

    // Integration tests for database operations require a running database
}
