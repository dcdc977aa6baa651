use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use surfspots_api::config;
use surfspots_api::database::{DatabaseManager, PgSpotStore, PgUserStore, SpotStore};
use surfspots_api::geocoding::NominatimClient;
use surfspots_api::handlers::{app, AppState};
use surfspots_api::services::{ManagementService, SurferService, UserService};
use surfspots_api::validation::country;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    info!("Starting Surf Spots API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set outside development");
    }
    info!("Loaded {} country codes", country::init());

    let state = build_state()?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Surf Spots API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close().await;
    Ok(())
}

fn build_state() -> Result<AppState> {
    let config = config::config();
    let pool = DatabaseManager::pool().context("database pool")?;

    let spots: Arc<dyn SpotStore> = Arc::new(PgSpotStore::new(pool.clone(), config.import.batch_size));
    let locations = Arc::new(NominatimClient::new(&config.geocoding).context("geocoding client")?);

    Ok(AppState {
        surfer: SurferService::new(spots.clone()),
        management: ManagementService::new(spots, locations),
        users: UserService::new(Arc::new(PgUserStore::new(pool))),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
