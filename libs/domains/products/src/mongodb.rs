//! MongoDB implementation of the product and category repositories
//!
//! Documents are keyed by an `ObjectId` `_id`; the models expose it as a hex
//! string. Identifiers that are not valid hex never match a document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Category, Product};
use crate::repository::{CategoryRepository, CategoryStream, ProductRepository, ProductStream};

pub const PRODUCTS_COLLECTION: &str = "products";
pub const CATEGORIES_COLLECTION: &str = "categories";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    price: f64,
    category: Category,
    created_at: DateTime<Utc>,
    #[serde(default)]
    picture: Option<String>,
}

impl ProductDocument {
    fn new(id: ObjectId, product: Product) -> Self {
        Self {
            id,
            name: product.name,
            price: product.price,
            category: product.category,
            created_at: product.created_at,
            picture: product.picture,
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Self {
            id: Some(doc.id.to_hex()),
            name: doc.name,
            price: doc.price,
            category: doc.category,
            created_at: doc.created_at,
            picture: doc.picture,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
}

impl From<CategoryDocument> for Category {
    fn from(doc: CategoryDocument) -> Self {
        Self {
            id: Some(doc.id.to_hex()),
            name: doc.name,
        }
    }
}

/// Parse a stored id for a write. Unlike lookups, a malformed id here is an error.
fn parse_for_write(id: &str) -> ProductResult<ObjectId> {
    ObjectId::parse_str(id)
        .map_err(|_| ProductError::Persistence(format!("invalid document id '{}'", id)))
}

/// MongoDB implementation of [`ProductRepository`]
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, PRODUCTS_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<ProductDocument>(collection_name),
        }
    }

    /// Create the name lookup index
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().name("idx_name".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> ProductResult<ProductStream> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": 1 })
            .await?;

        Ok(cursor
            .map_ok(Product::from)
            .map_err(ProductError::from)
            .boxed())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let product = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(product.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "name": name }).await?;
        Ok(product.map(Product::from))
    }

    #[instrument(skip(self, product), fields(product_id = ?product.id, product_name = %product.name))]
    async fn save(&self, product: Product) -> ProductResult<Product> {
        let document = match product.id.as_deref() {
            None => {
                let document = ProductDocument::new(ObjectId::new(), product);
                self.collection.insert_one(&document).await?;
                tracing::info!(product_id = %document.id, "Product inserted");
                document
            }
            Some(id) => {
                let oid = parse_for_write(id)?;
                let document = ProductDocument::new(oid, product);
                self.collection
                    .replace_one(doc! { "_id": oid }, &document)
                    .upsert(true)
                    .await?;
                tracing::info!(product_id = %oid, "Product replaced");
                document
            }
        };

        Ok(document.into())
    }

    #[instrument(skip(self, product), fields(product_id = ?product.id))]
    async fn delete(&self, product: &Product) -> ProductResult<()> {
        let Some(oid) = product
            .id
            .as_deref()
            .and_then(|id| ObjectId::parse_str(id).ok())
        else {
            return Ok(());
        };

        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        tracing::info!(product_id = %oid, deleted = result.deleted_count, "Product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> ProductResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}

/// MongoDB implementation of [`CategoryRepository`]
pub struct MongoCategoryRepository {
    collection: Collection<CategoryDocument>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, CATEGORIES_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<CategoryDocument>(collection_name),
        }
    }

    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().name("idx_name".to_string()).build())
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> ProductResult<CategoryStream> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?;

        Ok(cursor
            .map_ok(Category::from)
            .map_err(ProductError::from)
            .boxed())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Category>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let category = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(category.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Category>> {
        let category = self.collection.find_one(doc! { "name": name }).await?;
        Ok(category.map(Category::from))
    }

    #[instrument(skip(self, category), fields(category_name = %category.name))]
    async fn save(&self, category: Category) -> ProductResult<Category> {
        let document = match category.id.as_deref() {
            None => {
                let document = CategoryDocument {
                    id: ObjectId::new(),
                    name: category.name,
                };
                self.collection.insert_one(&document).await?;
                document
            }
            Some(id) => {
                let oid = parse_for_write(id)?;
                let document = CategoryDocument {
                    id: oid,
                    name: category.name,
                };
                self.collection
                    .replace_one(doc! { "_id": oid }, &document)
                    .upsert(true)
                    .await?;
                document
            }
        };

        tracing::info!(category_id = %document.id, "Category saved");
        Ok(document.into())
    }
}
