//! # Crewtask API Server
//!
//! Entry point: loads configuration, connects to PostgreSQL, applies
//! migrations, selects the mail dispatcher, and serves the API.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p crewtask-api
//! ```

use std::sync::Arc;

use crewtask_api::app::{build_router, AppState};
use crewtask_api::config::Config;
use crewtask_shared::db::migrations::run_migrations;
use crewtask_shared::db::pool::{create_pool, DatabaseConfig};
use crewtask_shared::mail::{HttpMailer, LogMailer, Mailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewtask_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Crewtask API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let mailer: Arc<dyn Mailer> = match (&config.mail.endpoint, &config.mail.api_key) {
        (Some(endpoint), Some(api_key)) => Arc::new(HttpMailer::new(
            endpoint.clone(),
            api_key.clone(),
            config.mail.from.clone(),
        )),
        _ => {
            tracing::warn!("MAIL_ENDPOINT not configured, verification codes will be logged");
            Arc::new(LogMailer)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, mailer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
