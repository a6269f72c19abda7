/// Configuration management for the API server
///
/// Loads configuration from environment variables (a `.env` file is
/// honored in development) into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
/// - `JWT_SECRET`: session-token signing key, >= 32 bytes (required)
/// - `JWT_VALIDITY_DAYS`: session lifetime (default: 180)
/// - `CONFIRMATION_TOKEN_TTL_HOURS`: confirmation-code TTL (default: 168)
/// - `RESET_TOKEN_TTL_MINUTES`: password-reset-code TTL (default: 15)
/// - `TOKEN_SINGLE_ACTIVE`: one live code per account and purpose
///   (default: false — new codes do not invalidate older ones)
/// - `MAIL_ENDPOINT` / `MAIL_API_KEY` / `MAIL_FROM`: transactional-mail
///   HTTP provider; when unset, mail is logged instead of sent
/// - `RUST_LOG`: log filter (default: info)

use chrono::Duration;
use crewtask_shared::tokens::IssuePolicy;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session token configuration
    pub jwt: JwtConfig,

    /// Verification-code configuration
    pub tokens: TokenConfig,

    /// Mail dispatch configuration
    pub mail: MailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; "*" means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session validity in days
    pub validity_days: i64,
}

/// Verification-code configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Confirmation-code TTL in hours
    pub confirmation_ttl_hours: i64,

    /// Password-reset-code TTL in minutes
    pub reset_ttl_minutes: i64,

    /// Whether issuing a code invalidates the account's older codes of
    /// the same purpose
    pub single_active: bool,
}

/// Mail dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Transactional-mail HTTP endpoint; None selects the log mailer
    pub endpoint: Option<String>,

    /// Provider API key
    pub api_key: Option<String>,

    /// Sender address
    pub from: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when required variables are missing or malformed,
    /// or when the JWT secret is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        let jwt_validity_days = env::var("JWT_VALIDITY_DAYS")
            .unwrap_or_else(|_| "180".to_string())
            .parse::<i64>()?;

        let confirmation_ttl_hours = env::var("CONFIRMATION_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse::<i64>()?;
        let reset_ttl_minutes = env::var("RESET_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<i64>()?;
        let single_active = env::var("TOKEN_SINGLE_ACTIVE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let mail_endpoint = env::var("MAIL_ENDPOINT").ok();
        let mail_api_key = env::var("MAIL_API_KEY").ok();
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@crewtask.dev".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                validity_days: jwt_validity_days,
            },
            tokens: TokenConfig {
                confirmation_ttl_hours,
                reset_ttl_minutes,
                single_active,
            },
            mail: MailConfig {
                endpoint: mail_endpoint,
                api_key: mail_api_key,
                from: mail_from,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Session token validity window
    pub fn jwt_validity(&self) -> Duration {
        Duration::days(self.jwt.validity_days)
    }

    /// Confirmation-code TTL
    pub fn confirmation_ttl(&self) -> Duration {
        Duration::hours(self.tokens.confirmation_ttl_hours)
    }

    /// Password-reset-code TTL
    pub fn reset_ttl(&self) -> Duration {
        Duration::minutes(self.tokens.reset_ttl_minutes)
    }

    /// Issue policy derived from configuration
    pub fn issue_policy(&self) -> IssuePolicy {
        if self.tokens.single_active {
            IssuePolicy::SingleActive
        } else {
            IssuePolicy::AllowMany
        }
    }
}
