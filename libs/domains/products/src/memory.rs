//! In-memory repositories for development and tests

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Category, Product};
use crate::repository::{CategoryRepository, CategoryStream, ProductRepository, ProductStream};

#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> ProductResult<ProductStream> {
        let mut snapshot: Vec<Product> = self.products.read().await.values().cloned().collect();
        snapshot.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn save(&self, mut product: Product) -> ProductResult<Product> {
        let id = product
            .id
            .get_or_insert_with(|| Uuid::new_v4().simple().to_string())
            .clone();

        self.products.write().await.insert(id, product.clone());
        Ok(product)
    }

    async fn delete(&self, product: &Product) -> ProductResult<()> {
        if let Some(id) = &product.id {
            self.products.write().await.remove(id);
        }
        Ok(())
    }

    async fn count(&self) -> ProductResult<u64> {
        Ok(self.products.read().await.len() as u64)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<String, Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_all(&self) -> ProductResult<CategoryStream> {
        let mut snapshot: Vec<Category> =
            self.categories.read().await.values().cloned().collect();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Category>> {
        Ok(self.categories.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn save(&self, mut category: Category) -> ProductResult<Category> {
        let id = category
            .id
            .get_or_insert_with(|| Uuid::new_v4().simple().to_string())
            .clone();

        self.categories.write().await.insert(id, category.clone());
        Ok(category)
    }
}
