/// API route handlers
///
/// Each submodule covers one resource:
/// - `health`: liveness and database connectivity
/// - `auth`: registration, login, token refresh, password change
/// - `users`: the authenticated user's own profile
/// - `teams`: team CRUD and policy management
/// - `members`: team roster management
/// - `projects`: project CRUD, including cross-team moves
/// - `tasks`: task CRUD within a project
/// - `comments`: comments on tasks

pub mod auth;
pub mod comments;
pub mod health;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod teams;
pub mod users;
