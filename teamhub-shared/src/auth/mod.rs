/// Authentication and authorization
///
/// - `jwt`: Token creation and validation
/// - `password`: Argon2id hashing and password strength rules
/// - `middleware`: Axum middleware extracting the authenticated actor
/// - `authz`: The authorization engine deciding team-scoped permissions

pub mod authz;
pub mod jwt;
pub mod middleware;
pub mod password;
