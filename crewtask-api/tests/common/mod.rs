/// Common test utilities for integration tests
///
/// Shared infrastructure: test database setup, app construction, seeded
/// accounts, session tokens, and a small JSON request helper. All tests
/// require a PostgreSQL database via DATABASE_URL and skip when it is not
/// set.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use crewtask_api::app::{build_router, AppState};
use crewtask_api::config::{
    ApiConfig, Config, DatabaseConfig, JwtConfig, MailConfig, TokenConfig,
};
use crewtask_shared::auth::jwt::{create_token, Claims};
use crewtask_shared::auth::password::hash_password;
use crewtask_shared::mail::LogMailer;
use crewtask_shared::models::token::TokenPurpose;
use crewtask_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt as _;
use uuid::Uuid;

/// Signing secret used by the test app
pub const TEST_JWT_SECRET: &str = "integration-test-secret-key-0123456789abcdef";

/// Test context containing the app and direct database access
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a context against the configured database, or None when
    /// DATABASE_URL is not set (callers skip the test).
    pub async fn new() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let db = PgPool::connect(&url).await.ok()?;
        sqlx::migrate!("../migrations").run(&db).await.ok()?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
                validity_days: 180,
            },
            tokens: TokenConfig {
                confirmation_ttl_hours: 168,
                reset_ttl_minutes: 15,
                single_active: false,
            },
            mail: MailConfig {
                endpoint: None,
                api_key: None,
                from: "noreply@crewtask.dev".to_string(),
            },
        };

        let state = AppState::new(db.clone(), config.clone(), Arc::new(LogMailer));
        let app = build_router(state);

        Some(Self { db, app, config })
    }

    /// A collision-free email for this test run
    pub fn unique_email(prefix: &str) -> String {
        format!("{}-{}@example.com", prefix, Uuid::new_v4())
    }

    /// Seeds an account directly in the database with a real password
    /// hash. Returns the account row.
    pub async fn seed_user(&self, email: &str, password: &str, confirmed: bool) -> User {
        let user = User::create(
            &self.db,
            CreateUser {
                email: email.to_string(),
                name: "Test User".to_string(),
                password_hash: hash_password(password).expect("Should hash password"),
            },
        )
        .await
        .expect("Should create user");

        if confirmed {
            User::confirm(&self.db, user.id).await.expect("Should confirm");
        }

        User::find_by_id(&self.db, user.id)
            .await
            .expect("Should reload user")
            .expect("User should exist")
    }

    /// Issues a session token for an account, as login would.
    pub fn session_for(&self, user_id: Uuid) -> String {
        let claims = Claims::new(user_id, self.config.jwt_validity());
        create_token(&claims, TEST_JWT_SECRET).expect("Should create token")
    }

    /// Reads the most recent verification code minted for an account.
    /// Stands in for reading the confirmation email.
    pub async fn latest_code(&self, user_id: Uuid, purpose: TokenPurpose) -> String {
        let (code,): (String,) = sqlx::query_as(
            r#"
            SELECT code FROM verification_tokens
            WHERE user_id = $1 AND purpose = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(purpose)
        .fetch_one(&self.db)
        .await
        .expect("Should find a verification code");
        code
    }

    /// Sends a JSON request through the router and returns status + body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        session: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = session {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request should complete");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");

        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }
}
