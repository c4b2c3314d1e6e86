//! Catalog API - product catalog REST server

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    let state = AppState::new(config, mongo_client);

    info!(
        "Successfully connected to MongoDB database: {}",
        state.config.mongodb.database()
    );

    state.catalog.uploads().ensure_dir().await?;
    info!(
        uploads_dir = %state.config.catalog.uploads_dir.display(),
        "Uploads directory ready"
    );

    api::init_indexes(&state).await?;

    if state.config.catalog.seed_demo_data {
        let seeded = state.catalog.seed_demo_data().await?;
        info!(seeded, "Demo data seeding finished");
    }

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(health_router(state.config.app));

    info!(
        "Starting Catalog API on port {} with graceful shutdown ({:?} timeout)",
        state.config.server.port, state.config.server.shutdown_timeout
    );

    let server = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();
    drop(state);

    create_production_app(app, &server, server.shutdown_timeout, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
