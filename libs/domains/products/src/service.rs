//! Catalog operations - sequencing of validation, upload and persistence

use chrono::Utc;
use futures::Stream;
use std::sync::Arc;
use tracing::instrument;

use crate::config::CatalogConfig;
use crate::error::{ProductError, ProductResult};
use crate::models::{Category, CategoryPayload, Product, ProductPayload};
use crate::repository::{CategoryRepository, CategoryStream, ProductRepository, ProductStream};
use crate::upload::UploadCoordinator;
use crate::validation::ensure_valid;

/// Product service
///
/// Every write runs in a fixed order: validate, then upload (when an image is
/// attached), then persist. Persistence is only reached after the upload has
/// completed, so a stored product never references a missing file. A save
/// that fails after a successful upload leaves the file orphaned; this is
/// logged, not compensated.
pub struct ProductService<P: ProductRepository, C: CategoryRepository> {
    products: Arc<P>,
    categories: Arc<C>,
    uploads: Arc<UploadCoordinator>,
    config: Arc<CatalogConfig>,
}

impl<P: ProductRepository, C: CategoryRepository> ProductService<P, C> {
    pub fn new(products: P, categories: C, config: CatalogConfig) -> Self {
        Self {
            products: Arc::new(products),
            categories: Arc::new(categories),
            uploads: Arc::new(UploadCoordinator::new(config.uploads_dir.clone())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    /// Stream every product
    #[instrument(skip(self))]
    pub async fn list(&self) -> ProductResult<ProductStream> {
        self.products.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> ProductResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("product", id))
    }

    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>> {
        self.products.find_by_name(name).await
    }

    /// Validate and persist a new product
    #[instrument(skip(self, payload), fields(product_name = ?payload.name))]
    pub async fn create(&self, payload: ProductPayload) -> ProductResult<Product> {
        ensure_valid(&payload)?;
        let product = payload.into_product(Utc::now())?;

        let saved = self.products.save(product).await?;
        tracing::info!(product_id = ?saved.id, "Product created");
        Ok(saved)
    }

    /// Overlay name, price and category onto an existing product
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: &str, payload: ProductPayload) -> ProductResult<Product> {
        ensure_valid(&payload)?;
        let mut product = self.get(id).await?;
        product.overlay(payload)?;

        let saved = self.products.save(product).await?;
        tracing::info!(product_id = %id, "Product updated");
        Ok(saved)
    }

    /// Remove a product. Deleting an id that is already gone is `NotFound`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> ProductResult<()> {
        let product = self.get(id).await?;
        self.products.delete(&product).await?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Attach a new image to an existing product
    #[instrument(skip(self, content))]
    pub async fn upload_image<S, B, E>(
        &self,
        id: &str,
        filename: &str,
        content: S,
    ) -> ProductResult<Product>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<ProductError>,
    {
        let mut product = self.get(id).await?;
        let stored = self.uploads.store(content, filename).await?;
        product.picture = Some(stored);

        self.save_with_picture(product).await
    }

    /// Create a product and its image from a multipart submission.
    ///
    /// Validation runs unless `validate_image_uploads` is off; required
    /// fields must be present either way.
    #[instrument(skip(self, payload, content), fields(product_name = ?payload.name))]
    pub async fn create_with_image<S, B, E>(
        &self,
        payload: ProductPayload,
        filename: &str,
        content: S,
    ) -> ProductResult<Product>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<ProductError>,
    {
        if self.config.validate_image_uploads {
            ensure_valid(&payload)?;
        }
        let mut product = payload.into_product(Utc::now())?;

        let stored = self.uploads.store(content, filename).await?;
        product.picture = Some(stored);

        self.save_with_picture(product).await
    }

    async fn save_with_picture(&self, product: Product) -> ProductResult<Product> {
        let picture = product.picture.clone();
        match self.products.save(product).await {
            Ok(saved) => {
                tracing::info!(product_id = ?saved.id, picture = ?saved.picture, "Product image attached");
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(
                    picture = ?picture,
                    error = %e,
                    "Product save failed after upload, stored file is orphaned"
                );
                Err(e)
            }
        }
    }

    /// Stream every category
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> ProductResult<CategoryStream> {
        self.categories.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: &str) -> ProductResult<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("category", id))
    }

    #[instrument(skip(self))]
    pub async fn find_category_by_name(&self, name: &str) -> ProductResult<Option<Category>> {
        self.categories.find_by_name(name).await
    }

    #[instrument(skip(self, payload))]
    pub async fn create_category(&self, payload: CategoryPayload) -> ProductResult<Category> {
        ensure_valid(&payload)?;
        let name = payload.name.unwrap_or_default();

        let saved = self.categories.save(Category::new(name)).await?;
        tracing::info!(category_id = ?saved.id, "Category created");
        Ok(saved)
    }

    pub(crate) fn product_repository(&self) -> &P {
        &self.products
    }

    pub(crate) fn category_repository(&self) -> &C {
        &self.categories
    }
}

fn not_found(kind: &str, id: &str) -> ProductError {
    ProductError::NotFound(format!("{} {}", kind, id))
}

impl<P: ProductRepository, C: CategoryRepository> Clone for ProductService<P, C> {
    fn clone(&self) -> Self {
        Self {
            products: Arc::clone(&self.products),
            categories: Arc::clone(&self.categories),
            uploads: Arc::clone(&self.uploads),
            config: Arc::clone(&self.config),
        }
    }
}
