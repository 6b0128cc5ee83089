/// Team model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE edit_policy AS ENUM ('all', 'admin');
///
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     public_edit edit_policy NOT NULL DEFAULT 'all',
///     privacy_edit edit_policy NOT NULL DEFAULT 'all',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Policy fields
///
/// - `public_edit`: who may change the team name and description
/// - `privacy_edit`: who may manage membership
///
/// Both are `all` (every member) or `admin` (team admins only). The policy
/// fields themselves may only ever be changed by an admin, regardless of
/// their current values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::team_member::TeamMember;

/// Per-team edit policy setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "edit_policy", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EditPolicy {
    /// All team members
    All,

    /// Only team admins
    Admin,
}

impl EditPolicy {
    /// Converts the policy to a string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            EditPolicy::All => "all",
            EditPolicy::Admin => "admin",
        }
    }
}

/// Team model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Team description
    pub description: String,

    /// Who may edit name and description
    pub public_edit: EditPolicy,

    /// Who may manage membership
    pub privacy_edit: EditPolicy,

    /// When the team was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new team
///
/// The policy fields are not accepted at creation time; both default to
/// `all` and can be changed afterwards by an admin.
#[derive(Debug, Clone)]
pub struct CreateTeam {
    /// Team name
    pub name: String,

    /// Team description
    pub description: String,
}

/// Input for updating a team
///
/// Only non-None fields are updated. Policy-field changes require the actor
/// to be an admin; that check is the caller's responsibility (via the
/// authorization engine) and must reject the whole update, not strip the
/// fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeam {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New public-edit policy
    pub public_edit: Option<EditPolicy>,

    /// New privacy-edit policy
    pub privacy_edit: Option<EditPolicy>,
}

impl UpdateTeam {
    /// Whether this update touches a policy field
    pub fn touches_policy(&self) -> bool {
        self.public_edit.is_some() || self.privacy_edit.is_some()
    }
}

impl Team {
    /// Creates a team and enrolls the creator as its first admin
    ///
    /// Both inserts happen in one transaction so a team can never exist
    /// without at least one admin member.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails or the transaction cannot be
    /// committed.
    pub async fn create_with_admin(
        pool: &PgPool,
        data: CreateTeam,
        creator_user_id: Uuid,
    ) -> Result<(Self, TeamMember), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, public_edit, privacy_edit, created_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await?;

        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (user_id, team_id, is_admin)
            VALUES ($1, $2, TRUE)
            RETURNING id, user_id, team_id, is_admin, created_at
            "#,
        )
        .bind(creator_user_id)
        .bind(team.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((team, member))
    }

    /// Finds a team by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, public_edit, privacy_edit, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists the teams a user belongs to
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.name, t.description, t.public_edit, t.privacy_edit, t.created_at
            FROM teams t
            JOIN team_members m ON m.team_id = t.id
            WHERE m.user_id = $1
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Applies a partial update
    ///
    /// Returns the updated team, or None if the team doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                public_edit = COALESCE($4, public_edit),
                privacy_edit = COALESCE($5, privacy_edit)
            WHERE id = $1
            RETURNING id, name, description, public_edit, privacy_edit, created_at
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.public_edit)
        .bind(data.privacy_edit)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Deletes a team
    ///
    /// Memberships and projects (and transitively tasks and comments) are
    /// removed by the database's cascade rules.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
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
    fn test_edit_policy_as_str() {
        assert_eq!(EditPolicy::All.as_str(), "all");
        assert_eq!(EditPolicy::Admin.as_str(), "admin");
    }

    #[test]
    fn test_edit_policy_serde() {
        assert_eq!(serde_json::to_string(&EditPolicy::All).unwrap(), "\"all\"");
        assert_eq!(
            serde_json::from_str::<EditPolicy>("\"admin\"").unwrap(),
            EditPolicy::Admin
        );
    }

    #[test]
    fn test_update_team_touches_policy() {
        let update = UpdateTeam {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(!update.touches_policy());

        let update = UpdateTeam {
            public_edit: Some(EditPolicy::Admin),
            ..Default::default()
        };
        assert!(update.touches_policy());

        let update = UpdateTeam {
            privacy_edit: Some(EditPolicy::All),
            ..Default::default()
        };
        assert!(update.touches_policy());
    }

    // Integration tests for database operations require a running database
}
