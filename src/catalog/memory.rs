//! In-memory catalog store.
//!
//! [`MemoryCatalog`] keeps the whole catalog and event history in process
//! memory behind a read-write lock, so it can be shared as an
//! `Arc<dyn CatalogStore>` while tests and the CLI keep seeding it through
//! `&self` mutators. Scans are linear; the store is meant for test fixtures
//! and datasets loaded from disk, not production traffic.

use std::collections::BTreeSet;

use parking_lot::RwLock;

use crate::catalog::dataset::Dataset;
use crate::catalog::{
    CatalogStore, Follow, Like, Order, OrderId, OrderLine, Product, ProductId, Review, UserId,
};
use crate::error::{Result, VerbenaError};

#[derive(Debug, Default)]
struct CatalogData {
    products: Vec<Product>,
    users: BTreeSet<UserId>,
    likes: Vec<Like>,
    orders: Vec<Order>,
    order_lines: Vec<OrderLine>,
    reviews: Vec<Review>,
    follows: Vec<Follow>,
}

/// In-memory implementation of [`CatalogStore`].
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogData>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a deserialized [`Dataset`].
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        dataset.validate()?;

        let catalog = Self::new();
        {
            let mut data = catalog.inner.write();
            for user in dataset.users {
                data.users.insert(user);
            }
            data.products = dataset.products;
            data.likes = dataset.likes;
            data.orders = dataset.orders;
            data.order_lines = dataset.order_lines;
            data.reviews = dataset.reviews;
            data.follows = dataset.follows;

            let extra: Vec<UserId> = data
                .likes
                .iter()
                .map(|l| l.user_id)
                .chain(data.orders.iter().map(|o| o.user_id))
                .chain(data.reviews.iter().map(|r| r.user_id))
                .chain(data.follows.iter().flat_map(|f| [f.follower, f.following]))
                .collect();
            data.users.extend(extra);
        }
        Ok(catalog)
    }

    /// Register a user with no activity yet.
    pub fn add_user(&self, user: UserId) {
        self.inner.write().users.insert(user);
    }

    /// Add a product to the catalog.
    pub fn add_product(&self, product: Product) {
        self.inner.write().products.push(product);
    }

    /// Record a like event.
    pub fn add_like(&self, like: Like) {
        let mut data = self.inner.write();
        data.users.insert(like.user_id);
        data.likes.push(like);
    }

    /// Remove a like edge (the "unlike" path).
    pub fn remove_like(&self, user: UserId, product: ProductId) {
        let mut data = self.inner.write();
        data.likes
            .retain(|l| !(l.user_id == user && l.product_id == product));
    }

    /// Record an order together with its lines.
    pub fn add_order(&self, order: Order, lines: Vec<OrderLine>) {
        let mut data = self.inner.write();
        data.users.insert(order.user_id);
        data.orders.push(order);
        data.order_lines.extend(lines);
    }

    /// Record a review.
    pub fn add_review(&self, review: Review) {
        let mut data = self.inner.write();
        data.users.insert(review.user_id);
        data.reviews.push(review);
    }

    /// Record a follow edge. Self-loops are rejected.
    pub fn add_follow(&self, follow: Follow) -> Result<()> {
        if follow.follower == follow.following {
            return Err(VerbenaError::invalid_operation(
                "a user cannot follow themselves",
            ));
        }
        let mut data = self.inner.write();
        data.users.insert(follow.follower);
        data.users.insert(follow.following);
        data.follows.push(follow);
        Ok(())
    }

    /// Remove a follow edge (the "unfollow" path).
    pub fn remove_follow(&self, follower: UserId, following: UserId) {
        let mut data = self.inner.write();
        data.follows
            .retain(|f| !(f.follower == follower && f.following == following));
    }

    /// Average review rating for a product, rounded to two decimals.
    ///
    /// Returns `None` when the product has no reviews.
    pub fn average_rating(&self, product: ProductId) -> Option<f64> {
        let data = self.inner.read();
        let ratings: Vec<u8> = data
            .reviews
            .iter()
            .filter(|r| r.product_id == product)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return None;
        }
        let avg = ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64;
        Some((avg * 100.0).round() / 100.0)
    }

    /// Number of reviews recorded for a product.
    pub fn review_count(&self, product: ProductId) -> usize {
        self.inner
            .read()
            .reviews
            .iter()
            .filter(|r| r.product_id == product)
            .count()
    }

}

impl CatalogStore for MemoryCatalog {
    fn products(&self) -> Result<Vec<Product>> {
        Ok(self.inner.read().products.clone())
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self
            .inner
            .read()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn user_ids(&self) -> Result<Vec<UserId>> {
        Ok(self.inner.read().users.iter().copied().collect())
    }

    fn likes(&self) -> Result<Vec<Like>> {
        Ok(self.inner.read().likes.clone())
    }

    fn likes_by_user(&self, user: UserId) -> Result<Vec<Like>> {
        Ok(self
            .inner
            .read()
            .likes
            .iter()
            .filter(|l| l.user_id == user)
            .cloned()
            .collect())
    }

    fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.inner.read().orders.clone())
    }

    fn orders_by_user(&self, user: UserId) -> Result<Vec<Order>> {
        Ok(self
            .inner
            .read()
            .orders
            .iter()
            .filter(|o| o.user_id == user)
            .cloned()
            .collect())
    }

    fn order_lines(&self, order: OrderId) -> Result<Vec<OrderLine>> {
        Ok(self
            .inner
            .read()
            .order_lines
            .iter()
            .filter(|line| line.order_id == order)
            .cloned()
            .collect())
    }

    fn reviews(&self) -> Result<Vec<Review>> {
        Ok(self.inner.read().reviews.clone())
    }

    fn reviews_by_user(&self, user: UserId) -> Result<Vec<Review>> {
        Ok(self
            .inner
            .read()
            .reviews
            .iter()
            .filter(|r| r.user_id == user)
            .cloned()
            .collect())
    }

    fn follows(&self) -> Result<Vec<Follow>> {
        Ok(self.inner.read().follows.clone())
    }

    fn following(&self, user: UserId) -> Result<Vec<UserId>> {
        Ok(self
            .inner
            .read()
            .follows
            .iter()
            .filter(|f| f.follower == user)
            .map(|f| f.following)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn product(id: ProductId, title: &str) -> Product {
        Product {
            id,
            title: title.to_string(),
            price: 25.0,
            category: "serum".to_string(),
            ingredients: vec!["niacinamide".to_string()],
            benefits: vec!["brightening".to_string()],
        }
    }

    #[test]
    fn test_products_roundtrip() {
        let catalog = MemoryCatalog::new();
        catalog.add_product(product(1, "Serum A"));
        catalog.add_product(product(2, "Serum B"));

        assert_eq!(catalog.products().unwrap().len(), 2);
        assert_eq!(catalog.product(1).unwrap().unwrap().title, "Serum A");
        assert!(catalog.product(99).unwrap().is_none());
    }

    #[test]
    fn test_users_registered_by_activity() {
        let catalog = MemoryCatalog::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        catalog.add_like(Like {
            user_id: 7,
            product_id: 1,
            created_at: ts,
        });
        catalog
            .add_follow(Follow {
                follower: 7,
                following: 9,
            })
            .unwrap();

        assert_eq!(catalog.user_ids().unwrap(), vec![7, 9]);
    }

    #[test]
    fn test_self_follow_rejected() {
        let catalog = MemoryCatalog::new();
        let result = catalog.add_follow(Follow {
            follower: 3,
            following: 3,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_average_rating_rounded() {
        let catalog = MemoryCatalog::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        for rating in [5, 4, 4] {
            catalog.add_review(Review {
                user_id: 1,
                product_id: 10,
                rating,
                created_at: ts,
            });
        }

        assert_eq!(catalog.average_rating(10), Some(4.33));
        assert_eq!(catalog.review_count(10), 3);
        assert_eq!(catalog.average_rating(11), None);
    }

    #[test]
    fn test_remove_like_and_follow() {
        let catalog = MemoryCatalog::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        catalog.add_like(Like {
            user_id: 1,
            product_id: 2,
            created_at: ts,
        });
        catalog
            .add_follow(Follow {
                follower: 1,
                following: 2,
            })
            .unwrap();

        catalog.remove_like(1, 2);
        catalog.remove_follow(1, 2);

        assert!(catalog.likes_by_user(1).unwrap().is_empty());
        assert!(catalog.following(1).unwrap().is_empty());
    }
}
