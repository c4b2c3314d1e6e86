//! Application state management

use domain_products::{MongoCategoryRepository, MongoProductRepository, ProductService};
use mongodb::{Client, Database};

pub type CatalogService = ProductService<MongoProductRepository, MongoCategoryRepository>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares the connection pool)
    pub mongo_client: Client,
    pub db: Database,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(config: crate::config::Config, mongo_client: Client) -> Self {
        let db = mongo_client.database(config.mongodb.database());
        let catalog = ProductService::new(
            MongoProductRepository::new(&db),
            MongoCategoryRepository::new(&db),
            config.catalog.clone(),
        );

        Self {
            config,
            mongo_client,
            db,
            catalog,
        }
    }
}
