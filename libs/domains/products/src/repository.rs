use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ProductResult;
use crate::models::{Category, Product};

/// Lazy product sequence. Each `find_all` call starts a fresh one.
pub type ProductStream = BoxStream<'static, ProductResult<Product>>;

pub type CategoryStream = BoxStream<'static, ProductResult<Category>>;

/// Persistence gateway for products
///
/// Implementations own identifier assignment: `save` on a product without an
/// id inserts it and returns the stored copy carrying the new id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stream every product
    async fn find_all(&self) -> ProductResult<ProductStream>;

    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Product>>;

    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>>;

    /// Insert when `product.id` is `None`, replace otherwise
    async fn save(&self, product: Product) -> ProductResult<Product>;

    async fn delete(&self, product: &Product) -> ProductResult<()>;

    async fn count(&self) -> ProductResult<u64>;
}

/// Persistence gateway for categories
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(&self) -> ProductResult<CategoryStream>;

    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Category>>;

    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Category>>;

    /// Insert when `category.id` is `None`, replace otherwise
    async fn save(&self, category: Category) -> ProductResult<Category>;
}
