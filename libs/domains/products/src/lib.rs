//! Products Domain
//!
//! Product catalog over MongoDB: validation, image upload coordination,
//! catalog operations and HTTP response assembly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart parsing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────┐
//! │   Service   │ ──▶ │  Uploads   │  ← temp file + atomic rename
//! └──────┬──────┘     └────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + MongoDB / in-memory implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← entities, payloads, validation rules
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{
//!     handlers, CatalogConfig, MongoCategoryRepository, MongoProductRepository, ProductService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let service = ProductService::new(
//!     MongoProductRepository::new(&db),
//!     MongoCategoryRepository::new(&db),
//!     CatalogConfig::new("./uploads"),
//! );
//!
//! let products = handlers::router(service.clone());
//! let categories = handlers::categories_router(service);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod response;
pub mod seed;
pub mod service;
pub mod upload;
pub mod validation;

// Re-export commonly used types
pub use config::CatalogConfig;
pub use error::{ProductError, ProductResult};
pub use handlers::{categories_router, router, ApiDoc, CategoriesApiDoc};
pub use memory::{InMemoryCategoryRepository, InMemoryProductRepository};
pub use models::{Category, CategoryPayload, Product, ProductPayload};
pub use self::mongodb::{MongoCategoryRepository, MongoProductRepository};
pub use repository::{CategoryRepository, ProductRepository};
pub use service::ProductService;
pub use upload::UploadCoordinator;
pub use validation::FieldViolation;
