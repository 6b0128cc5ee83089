/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use teamhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = teamhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use teamhub_shared::auth::middleware::create_jwt_middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                           # Health check (public)
/// ├── /v1/
/// │   ├── /auth/
/// │   │   ├── POST /register            # Public
/// │   │   ├── POST /login               # Public
/// │   │   ├── POST /refresh             # Public
/// │   │   └── POST /password            # Authenticated
/// │   ├── /users/
/// │   │   ├── GET   /me
/// │   │   └── PATCH /me
/// │   ├── /teams/
/// │   │   ├── GET    /                  # Teams the caller belongs to
/// │   │   ├── POST   /
/// │   │   ├── GET    /:id
/// │   │   ├── PATCH  /:id
/// │   │   ├── DELETE /:id
/// │   │   ├── GET    /:id/members
/// │   │   ├── POST   /:id/members       # Batch add by email
/// │   │   ├── PATCH  /:id/members       # Batch role change
/// │   │   └── DELETE /:id/members/:member_id
/// │   └── /projects/
/// │       ├── GET    /                  # Projects across the caller's teams
/// │       ├── POST   /
/// │       ├── GET    /:id
/// │       ├── PATCH  /:id
/// │       ├── DELETE /:id
/// │       ├── GET    /:id/tasks
/// │       ├── POST   /:id/tasks
/// │       ├── GET    /:id/tasks/:task_id
/// │       ├── PATCH  /:id/tasks/:task_id
/// │       ├── DELETE /:id/tasks/:task_id
/// │       ├── GET    /:id/tasks/:task_id/comments
/// │       ├── POST   /:id/tasks/:task_id/comments
/// │       └── DELETE /:id/tasks/:task_id/comments/:comment_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // One middleware instance shared by all authenticated route groups; it
    // validates the bearer token and injects an AuthContext extension
    let auth_layer = axum::middleware::from_fn(create_jwt_middleware(state.jwt_secret().to_string()));

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Password change needs a valid token for the current user
    let password_routes = Router::new()
        .route("/password", post(routes::auth::change_password))
        .layer(auth_layer.clone());

    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/me", patch(routes::users::update_me))
        .layer(auth_layer.clone());

    let team_routes = Router::new()
        .route("/", get(routes::teams::list_teams))
        .route("/", post(routes::teams::create_team))
        .route("/:id", get(routes::teams::get_team))
        .route("/:id", patch(routes::teams::update_team))
        .route("/:id", delete(routes::teams::delete_team))
        .route("/:id/members", get(routes::members::list_members))
        .route("/:id/members", post(routes::members::add_members))
        .route("/:id/members", patch(routes::members::update_members))
        .route(
            "/:id/members/:member_id",
            delete(routes::members::remove_member),
        )
        .layer(auth_layer.clone());

    let project_routes = Router::new()
        .route("/", get(routes::projects::list_projects))
        .route("/", post(routes::projects::create_project))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", patch(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/tasks", get(routes::tasks::list_tasks))
        .route("/:id/tasks", post(routes::tasks::create_task))
        .route("/:id/tasks/:task_id", get(routes::tasks::get_task))
        .route("/:id/tasks/:task_id", patch(routes::tasks::update_task))
        .route("/:id/tasks/:task_id", delete(routes::tasks::delete_task))
        .route(
            "/:id/tasks/:task_id/comments",
            get(routes::comments::list_comments),
        )
        .route(
            "/:id/tasks/:task_id/comments",
            post(routes::comments::create_comment),
        )
        .route(
            "/:id/tasks/:task_id/comments/:comment_id",
            delete(routes::comments::delete_comment),
        )
        .layer(auth_layer.clone());

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes.merge(password_routes))
        .nest("/users", user_routes)
        .nest("/teams", team_routes)
        .nest("/projects", project_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
