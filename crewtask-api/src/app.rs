/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with
/// all routes and middleware.
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                         # Health check (public)
/// └── /api/
///     ├── /auth/                      # Account flows
///     │   ├── POST /create-account            (public)
///     │   ├── POST /confirm-account           (public)
///     │   ├── POST /login                     (public)
///     │   ├── POST /request-code              (public)
///     │   ├── POST /forgot-password           (public)
///     │   ├── POST /validate-token            (public)
///     │   ├── POST /update-password/:token    (public)
///     │   └── GET  /user                      (bearer)
///     └── /projects/                  # Everything below requires bearer auth
///         ├── CRUD on projects
///         ├── .../tasks and .../tasks/:id/status
///         ├── .../team
///         └── .../tasks/:id/notes
/// ```
///
/// # Middleware stack
///
/// Applied in order (bottom to top): tracing, CORS, bearer authentication
/// on the protected nests.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use crewtask_shared::mail::Mailer;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; Arc keeps the clone
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Transactional mail sender
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets the session-token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public account flows
    let auth_public = Router::new()
        .route("/create-account", post(routes::auth::create_account))
        .route("/confirm-account", post(routes::auth::confirm_account))
        .route("/login", post(routes::auth::login))
        .route("/request-code", post(routes::auth::request_code))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/validate-token", post(routes::auth::validate_token))
        .route(
            "/update-password/:token",
            post(routes::auth::update_password),
        );

    // Profile endpoint (requires bearer auth)
    let auth_protected = Router::new()
        .route("/user", get(routes::auth::get_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let auth_routes = auth_public.merge(auth_protected);

    // Project tree (requires bearer auth throughout)
    let project_routes = Router::new()
        .route("/", post(routes::projects::create_project))
        .route("/", get(routes::projects::list_projects))
        .route("/:project_id", get(routes::projects::get_project))
        .route("/:project_id", put(routes::projects::update_project))
        .route("/:project_id", delete(routes::projects::delete_project))
        .route("/:project_id/tasks", post(routes::tasks::create_task))
        .route("/:project_id/tasks", get(routes::tasks::list_tasks))
        .route("/:project_id/tasks/:task_id", get(routes::tasks::get_task))
        .route("/:project_id/tasks/:task_id", put(routes::tasks::update_task))
        .route(
            "/:project_id/tasks/:task_id",
            delete(routes::tasks::delete_task),
        )
        .route(
            "/:project_id/tasks/:task_id/status",
            post(routes::tasks::update_status),
        )
        .route("/:project_id/team", get(routes::team::get_team))
        .route("/:project_id/team/find", post(routes::team::find_member))
        .route("/:project_id/team", post(routes::team::add_member))
        .route(
            "/:project_id/team/:user_id",
            delete(routes::team::remove_member),
        )
        .route(
            "/:project_id/tasks/:task_id/notes",
            post(routes::notes::create_note),
        )
        .route(
            "/:project_id/tasks/:task_id/notes",
            get(routes::notes::list_notes),
        )
        .route(
            "/:project_id/tasks/:task_id/notes/:note_id",
            delete(routes::notes::delete_note),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/projects", project_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
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
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Delegates to the shared middleware, which validates the session token,
/// loads the account, and attaches an `AuthContext` extension.
async fn bearer_auth_layer(
    state: axum::extract::State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    use axum::response::IntoResponse;

    match crewtask_shared::auth::middleware::bearer_auth(
        state.db.clone(),
        state.config.jwt.secret.clone(),
        req,
        next,
    )
    .await
    {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
