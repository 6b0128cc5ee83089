/// Database models for TeamHub
///
/// Each model module contains the row struct, the create/update input
/// structs, and the sqlx queries operating on it.
///
/// # Models
///
/// - `user`: User accounts
/// - `team`: Teams and their edit-policy settings
/// - `team_member`: User-team membership with the admin flag
/// - `project`: Projects owned by a team
/// - `task`: Tasks within a project
/// - `comment`: Comments on tasks

use serde::{Deserialize, Deserializer};

pub mod comment;
pub mod project;
pub mod task;
pub mod team;
pub mod team_member;
pub mod user;

/// Deserializer for PATCH fields where an explicit `null` must stay
/// distinguishable from an absent field
///
/// Pair a double-`Option` field with `#[serde(default)]` and this function:
/// outer `None` means the field was absent (keep the current value),
/// `Some(None)` means `null` was sent (clear it), `Some(Some(v))` carries a
/// replacement.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
