//! MongoDB repository tests
//!
//! Run with `cargo test -p domain_products -- --ignored` (requires Docker).

use domain_products::*;
use futures::TryStreamExt;
use test_utils::{TestDataBuilder, TestMongo};

#[tokio::test]
#[ignore = "requires docker"]
async fn test_product_save_find_replace_delete() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_test");
    let repo = MongoProductRepository::new(&db);
    repo.init_indexes().await.unwrap();

    let builder = TestDataBuilder::from_test_name("mongo_product_crud");
    let name = builder.name("product", "tv");

    let saved = repo
        .save(Product::new(&name, 250.0, Category::new("Electronic")))
        .await
        .unwrap();
    let id = saved.id.clone().unwrap();
    assert_eq!(id.len(), 24);

    let by_name = repo.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(by_name.id, saved.id);

    let mut renamed = saved.clone();
    renamed.name = builder.name("product", "headphones");
    let replaced = repo.save(renamed).await.unwrap();
    assert_eq!(replaced.id, saved.id);
    assert_eq!(repo.count().await.unwrap(), 1);

    let all: Vec<Product> = repo.find_all().await.unwrap().try_collect().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, replaced.name);

    repo.delete(&replaced).await.unwrap();
    assert!(repo.find_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_invalid_object_id_is_not_found() {
    let mongo = TestMongo::new().await;
    let repo = MongoProductRepository::new(&mongo.database("catalog_test"));

    assert!(repo.find_by_id("not-hex").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_seed_against_mongo() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_seed_test");
    let service = ProductService::new(
        MongoProductRepository::new(&db),
        MongoCategoryRepository::new(&db),
        CatalogConfig::default(),
    );

    let inserted = service.seed_demo_data().await.unwrap();
    assert!(inserted > 0);
    assert_eq!(service.seed_demo_data().await.unwrap(), 0);

    let electronic = service
        .find_category_by_name("Electronic")
        .await
        .unwrap()
        .unwrap();
    assert!(electronic.id.is_some());
}
