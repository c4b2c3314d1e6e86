//! Demo catalog data

use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{Category, Product};
use crate::repository::{CategoryRepository, ProductRepository};
use crate::service::ProductService;

pub const DEMO_CATEGORIES: [&str; 4] = ["Electronic", "Sports", "Computing", "Furniture"];

/// (name, price, category)
pub const DEMO_PRODUCTS: [(&str, f64, &str); 8] = [
    ("TV Panasonic LCD", 456.89, "Electronic"),
    ("Sony Camera HD Digital", 177.89, "Electronic"),
    ("Apple iPod", 46.89, "Electronic"),
    ("Sony Notebook", 846.89, "Computing"),
    ("HP Multifunctional", 200.89, "Computing"),
    ("Mouse Logitech", 19.90, "Computing"),
    ("Bianchi Bicycle", 70.89, "Sports"),
    ("Mica Dresser", 150.89, "Furniture"),
];

impl<P: ProductRepository, C: CategoryRepository> ProductService<P, C> {
    /// Seed demo categories and products when the product collection is empty.
    ///
    /// Returns the number of products inserted. Categories are looked up by
    /// name first so reruns don't duplicate them.
    #[instrument(skip(self))]
    pub async fn seed_demo_data(&self) -> ProductResult<usize> {
        let existing = self.product_repository().count().await?;
        if existing > 0 {
            tracing::info!(existing, "Catalog already populated, skipping demo seed");
            return Ok(0);
        }

        let mut categories = Vec::with_capacity(DEMO_CATEGORIES.len());
        for name in DEMO_CATEGORIES {
            let category = match self.category_repository().find_by_name(name).await? {
                Some(found) => found,
                None => self.category_repository().save(Category::new(name)).await?,
            };
            categories.push(category);
        }

        let mut inserted = 0;
        for (name, price, category_name) in DEMO_PRODUCTS {
            let Some(category) = categories.iter().find(|c| c.name == category_name) else {
                continue;
            };

            let product = Product::new(name, price, category.clone());
            let saved = self.product_repository().save(product).await?;
            tracing::debug!(product_id = ?saved.id, name, "Seeded product");
            inserted += 1;
        }

        tracing::info!(products = inserted, categories = categories.len(), "Demo catalog seeded");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CatalogConfig;
    use crate::memory::{InMemoryCategoryRepository, InMemoryProductRepository};
    use crate::service::ProductService;

    use super::*;

    fn service() -> ProductService<InMemoryProductRepository, InMemoryCategoryRepository> {
        ProductService::new(
            InMemoryProductRepository::new(),
            InMemoryCategoryRepository::new(),
            CatalogConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_seed_populates_empty_catalog_once() {
        let service = service();

        assert_eq!(service.seed_demo_data().await.unwrap(), DEMO_PRODUCTS.len());
        assert_eq!(service.seed_demo_data().await.unwrap(), 0);

        let ipod = service.find_by_name("Apple iPod").await.unwrap().unwrap();
        assert_eq!(ipod.category.name, "Electronic");
        assert!(ipod.category.id.is_some());
    }

    #[tokio::test]
    async fn test_seed_reuses_existing_categories() {
        let service = service();
        let sports = service
            .category_repository()
            .save(Category::new("Sports"))
            .await
            .unwrap();

        service.seed_demo_data().await.unwrap();

        let bike = service.find_by_name("Bianchi Bicycle").await.unwrap().unwrap();
        assert_eq!(bike.category.id, sports.id);
    }
}
