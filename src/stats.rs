//! Corpus statistics for monitoring and the CLI.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogStore;
use crate::error::Result;

/// Aggregate counts describing the recommendation corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationStats {
    pub total_users: usize,
    pub total_products: usize,
    pub total_likes: usize,
    /// Order lines in qualifying (purchased) orders only.
    pub total_purchases: usize,
    pub total_reviews: usize,
    pub total_follows: usize,
    /// (likes + purchases + reviews) / max(users, 1).
    pub avg_interactions_per_user: f64,
}

/// Compute corpus statistics from the store.
pub fn recommendation_stats(store: &dyn CatalogStore) -> Result<RecommendationStats> {
    let total_users = store.user_ids()?.len();
    let total_products = store.products()?.len();
    let total_likes = store.likes()?.len();
    let total_reviews = store.reviews()?.len();
    let total_follows = store.follows()?.len();

    let mut total_purchases = 0usize;
    for order in store.orders()? {
        if order.status.is_purchase() {
            total_purchases += store.order_lines(order.id)?.len();
        }
    }

    let interactions = (total_likes + total_purchases + total_reviews) as f64;
    let avg_interactions_per_user = interactions / total_users.max(1) as f64;

    Ok(RecommendationStats {
        total_users,
        total_products,
        total_likes,
        total_purchases,
        total_reviews,
        total_follows,
        avg_interactions_per_user,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::catalog::memory::MemoryCatalog;
    use crate::catalog::{Follow, Like, Order, OrderLine, OrderStatus, Product, Review};

    #[test]
    fn test_counts_and_average() {
        let catalog = MemoryCatalog::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        catalog.add_product(Product {
            id: 1,
            title: "Serum".to_string(),
            price: 30.0,
            category: "serum".to_string(),
            ingredients: vec![],
            benefits: vec![],
        });
        catalog.add_like(Like {
            user_id: 1,
            product_id: 1,
            created_at: ts,
        });
        catalog.add_order(
            Order {
                id: 1,
                user_id: 1,
                status: OrderStatus::Delivered,
                created_at: ts,
            },
            vec![OrderLine {
                order_id: 1,
                product_id: 1,
                quantity: 1,
            }],
        );
        // A cancelled order contributes no purchases.
        catalog.add_order(
            Order {
                id: 2,
                user_id: 2,
                status: OrderStatus::Cancelled,
                created_at: ts,
            },
            vec![OrderLine {
                order_id: 2,
                product_id: 1,
                quantity: 1,
            }],
        );
        catalog.add_review(Review {
            user_id: 2,
            product_id: 1,
            rating: 4,
            created_at: ts,
        });
        catalog
            .add_follow(Follow {
                follower: 1,
                following: 2,
            })
            .unwrap();

        let stats = recommendation_stats(&catalog).unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_products, 1);
        assert_eq!(stats.total_likes, 1);
        assert_eq!(stats.total_purchases, 1);
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.total_follows, 1);
        assert!((stats.avg_interactions_per_user - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_store_divides_by_one() {
        let catalog = MemoryCatalog::new();
        let stats = recommendation_stats(&catalog).unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.avg_interactions_per_user, 0.0);
    }
}
