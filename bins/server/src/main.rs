//! Dealdesk API Server
//!
//! Main entry point for the Dealdesk backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealdesk_api::{AppState, create_router, oauth::GoogleOAuthClient};
use dealdesk_core::auth::AdminPolicy;
use dealdesk_core::storage::{StorageConfig, StorageService};
use dealdesk_db::connect;
use dealdesk_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dealdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;
    info!("Connected to database");

    let storage_config = StorageConfig::from_settings(&config.storage);
    let max_file_size = storage_config.max_file_size;
    let storage = StorageService::from_config(storage_config)
        .context("Failed to initialize object storage")?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        max_file_size,
        "Object storage configured"
    );

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let admin = AdminPolicy::new(config.admin.emails.iter());
    if admin.is_empty() {
        warn!("Admin allow-list is empty; user management is disabled");
    } else {
        info!(admins = admin.len(), "Admin allow-list loaded");
    }

    let google = config.oauth.google.clone().map(|settings| {
        info!("Google OAuth integration configured");
        Arc::new(GoogleOAuthClient::new(settings))
    });

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage: Arc::new(storage),
        admin: Arc::new(admin),
        google,
        max_file_size,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
