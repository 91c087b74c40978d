//! authpair API Server
//!
//! REST API server issuing and revoking access/refresh token pairs.
//!
//! Author: hephaex@gmail.com

use authpair_api::{create_router, state::AppState};
use authpair_core::{config::AppConfig, connect_store};
use std::sync::Arc;
use std::time::Duration;

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("AUTHPAIR_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "authpair_api={level},authpair_core={level},tower_http=debug",
            level = config.logging.level
        )
        .into()
    });

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config);

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set, using the development signing secret");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Connect the credential store
    let store = connect_store(&config.database).await?;
    tracing::info!(backend = ?config.database.backend, "Credential store ready");

    let purge_interval = Duration::from_secs(config.auth.purge_interval_secs.max(1));
    let state = Arc::new(AppState::new(config, store));

    // Periodically drop expired refresh tokens
    let purge_state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = purge_state.auth.purge_expired().await {
                tracing::warn!(error = %e, "Refresh token purge failed");
            }
        }
    });

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("authpair API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
