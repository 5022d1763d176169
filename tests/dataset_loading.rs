use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use verbena::cache::MemoryCache;
use verbena::catalog::dataset::Dataset;
use verbena::catalog::memory::MemoryCatalog;
use verbena::engine::Recommender;

const DATASET_JSON: &str = r#"{
    "products": [
        {"id": 1, "title": "Niacinamide Serum", "price": 29.99, "category": "serum",
         "ingredients": ["niacinamide"], "benefits": ["brightening"]},
        {"id": 2, "title": "Zinc Serum", "price": 34.99, "category": "serum",
         "ingredients": ["niacinamide", "zinc"], "benefits": ["brightening"]},
        {"id": 3, "title": "Foaming Cleanser", "price": 12.50, "category": "cleanser",
         "ingredients": ["salicylic acid"], "benefits": ["cleansing"]}
    ],
    "likes": [
        {"user_id": 1, "product_id": 1, "created_at": "2024-05-01T10:00:00Z"}
    ],
    "orders": [
        {"id": 1, "user_id": 2, "status": "delivered", "created_at": "2024-05-02T10:00:00Z"}
    ],
    "order_lines": [
        {"order_id": 1, "product_id": 2, "quantity": 1},
        {"order_id": 1, "product_id": 3, "quantity": 2}
    ],
    "reviews": [
        {"user_id": 1, "product_id": 2, "rating": 5, "created_at": "2024-05-03T10:00:00Z"}
    ],
    "follows": [
        {"follower": 1, "following": 2}
    ]
}"#;

#[test]
fn dataset_file_loads_into_working_engine() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DATASET_JSON.as_bytes()).unwrap();

    let dataset = Dataset::from_path(file.path()).unwrap();
    dataset.validate().unwrap();
    let catalog = Arc::new(MemoryCatalog::from_dataset(dataset).unwrap());

    assert_eq!(catalog.average_rating(2), Some(5.0));

    let engine = Recommender::new(catalog, Arc::new(MemoryCache::new()));

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.total_likes, 1);
    assert_eq!(stats.total_purchases, 2);
    assert_eq!(stats.total_follows, 1);

    // Content similarity works over the loaded catalog: the serums pair up.
    let similar = engine.similar_products(1, 5).unwrap();
    assert_eq!(similar[0].product_id, 2);

    // User 1's history excludes product 1 from their recommendations.
    let recs = engine.recommend(1, 10).unwrap();
    assert!(recs.items.iter().all(|item| item.product.id != 1));
}

#[test]
fn malformed_dataset_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{\"products\": [{\"id\": \"oops\"}]}").unwrap();

    assert!(Dataset::from_path(file.path()).is_err());
}
