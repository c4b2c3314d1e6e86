//! API routes module

pub mod health;

use axum::Router;
use domain_products::{categories_router, router, MongoCategoryRepository, MongoProductRepository};

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", router(state.catalog.clone()))
        .nest("/categories", categories_router(state.catalog.clone()))
        .merge(health::router(state.clone()))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoProductRepository::new(&state.db).init_indexes().await?;
    MongoCategoryRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
