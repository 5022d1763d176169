//! Out-of-band cache refresh job.
//!
//! Meant to run from cron or an admin action: optionally refit the feature
//! vectors, cache the cold-start lists, warm the most-active users, and
//! cache similar-products lists for the most popular products, strictly
//! sequentially. A failure for one subject is logged and counted, never
//! aborts the batch.

use std::time::Instant;

use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::{ProductId, UserId};
use crate::engine::Recommender;
use crate::error::Result;

/// Recent-activity window used to pick users worth warming.
const ACTIVITY_WINDOW_DAYS: i64 = 30;

/// Default cap on products processed for similarity caching.
const DEFAULT_PRODUCT_CAP: usize = 100;

/// Options for a refresh run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshOptions {
    /// Process at most this many users (most active first); `None` = all.
    pub max_users: Option<usize>,
    /// Process at most this many products (most popular first);
    /// `None` = the default cap of 100.
    pub max_products: Option<usize>,
    /// Refit the feature vector space before warming.
    pub rebuild_vectors: bool,
}

/// Outcome of a refresh run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub vectors_rebuilt: bool,
    pub cold_start_cached: bool,
    pub users_warmed: usize,
    pub users_failed: usize,
    pub products_cached: usize,
    pub products_failed: usize,
    pub elapsed_ms: u64,
}

/// Sequential cache refresh over users and products.
pub struct RefreshJob<'a> {
    recommender: &'a Recommender,
    options: RefreshOptions,
}

impl<'a> RefreshJob<'a> {
    /// Create a job over the given recommender.
    pub fn new(recommender: &'a Recommender, options: RefreshOptions) -> Self {
        Self {
            recommender,
            options,
        }
    }

    /// Run the refresh and return a summary.
    pub fn run(&self) -> Result<RefreshSummary> {
        let started = Instant::now();
        let now = Utc::now();
        info!("starting recommendation cache refresh");

        let vectors_rebuilt = if self.options.rebuild_vectors {
            let built = self.recommender.rebuild_feature_vectors()?;
            info!("feature vectors rebuilt (space fitted: {built})");
            built
        } else {
            false
        };

        let cold_start_cached = self.recommender.warm_cold_start();
        if !cold_start_cached {
            warn!("cold-start warming failed, continuing with users");
        }

        let users = self.active_users(now)?;
        info!("warming {} active users", users.len());
        let mut users_warmed = 0usize;
        let mut users_failed = 0usize;
        for user in users {
            if self.recommender.warm_user(user) {
                users_warmed += 1;
            } else {
                users_failed += 1;
            }
        }

        let products = self.popular_products()?;
        info!("caching similar products for {} products", products.len());
        let mut products_cached = 0usize;
        let mut products_failed = 0usize;
        for product in products {
            if self.recommender.warm_product(product) {
                products_cached += 1;
            } else {
                products_failed += 1;
            }
        }

        let summary = RefreshSummary {
            vectors_rebuilt,
            cold_start_cached,
            users_warmed,
            users_failed,
            products_cached,
            products_failed,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "cache refresh done: {} users warmed ({} failed), {} products cached ({} failed)",
            summary.users_warmed,
            summary.users_failed,
            summary.products_cached,
            summary.products_failed
        );
        Ok(summary)
    }

    /// Users with recent activity, most active first.
    ///
    /// Activity score over the window: likes + 3 x orders + 2 x reviews.
    fn active_users(&self, now: DateTime<Utc>) -> Result<Vec<UserId>> {
        let store = self.recommender.store();
        let cutoff = now - Duration::days(ACTIVITY_WINDOW_DAYS);
        let mut activity: AHashMap<UserId, u64> = AHashMap::new();

        for like in store.likes()? {
            if like.created_at >= cutoff {
                *activity.entry(like.user_id).or_insert(0) += 1;
            }
        }
        for order in store.orders()? {
            if order.created_at >= cutoff {
                *activity.entry(order.user_id).or_insert(0) += 3;
            }
        }
        for review in store.reviews()? {
            if review.created_at >= cutoff {
                *activity.entry(review.user_id).or_insert(0) += 2;
            }
        }

        let mut users: Vec<(UserId, u64)> = activity.into_iter().collect();
        users.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(cap) = self.options.max_users {
            users.truncate(cap);
        }
        Ok(users.into_iter().map(|(user, _)| user).collect())
    }

    /// Products with any engagement, most popular first.
    ///
    /// Popularity score: likes + 3 x order lines + 2 x reviews, all time.
    fn popular_products(&self) -> Result<Vec<ProductId>> {
        let store = self.recommender.store();
        let mut popularity: AHashMap<ProductId, u64> = AHashMap::new();

        for like in store.likes()? {
            *popularity.entry(like.product_id).or_insert(0) += 1;
        }
        for order in store.orders()? {
            for line in store.order_lines(order.id)? {
                *popularity.entry(line.product_id).or_insert(0) += 3;
            }
        }
        for review in store.reviews()? {
            *popularity.entry(review.product_id).or_insert(0) += 2;
        }

        let mut products: Vec<(ProductId, u64)> = popularity.into_iter().collect();
        products.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        products.truncate(self.options.max_products.unwrap_or(DEFAULT_PRODUCT_CAP));
        Ok(products.into_iter().map(|(product, _)| product).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::catalog::memory::MemoryCatalog;
    use crate::catalog::{Like, Product};

    fn product(id: ProductId) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            price: 30.0,
            category: "serum".to_string(),
            ingredients: vec![format!("ingredient{id}")],
            benefits: vec![],
        }
    }

    fn like_at_days_ago(catalog: &MemoryCatalog, user: UserId, product: ProductId, days: i64) {
        catalog.add_like(Like {
            user_id: user,
            product_id: product,
            created_at: Utc::now() - ChronoDuration::days(days),
        });
    }

    #[test]
    fn test_refresh_warms_users_and_products() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.add_product(product(1));
        catalog.add_product(product(2));
        like_at_days_ago(&catalog, 5, 1, 2);
        like_at_days_ago(&catalog, 6, 2, 3);

        let cache = Arc::new(MemoryCache::new());
        let recommender = Recommender::new(catalog, cache.clone());

        let summary = RefreshJob::new(
            &recommender,
            RefreshOptions {
                rebuild_vectors: true,
                ..Default::default()
            },
        )
        .run()
        .unwrap();

        assert!(summary.vectors_rebuilt);
        assert!(summary.cold_start_cached);
        assert_eq!(summary.users_warmed, 2);
        assert_eq!(summary.users_failed, 0);
        assert_eq!(summary.products_cached, 2);
        assert!(cache.len() > 0);
    }

    #[test]
    fn test_refresh_caps_users_by_activity() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.add_product(product(1));
        // User 5 is the most active; user 6 has one stale like.
        like_at_days_ago(&catalog, 5, 1, 1);
        like_at_days_ago(&catalog, 5, 1, 2);
        like_at_days_ago(&catalog, 6, 1, 90);

        let cache = Arc::new(MemoryCache::new());
        let recommender = Recommender::new(catalog, cache);

        let summary = RefreshJob::new(
            &recommender,
            RefreshOptions {
                max_users: Some(1),
                ..Default::default()
            },
        )
        .run()
        .unwrap();

        // User 6's activity is outside the window entirely, so only user 5
        // was eligible and the cap changes nothing.
        assert_eq!(summary.users_warmed, 1);
    }

    #[test]
    fn test_refresh_on_empty_store_is_clean() {
        let catalog = Arc::new(MemoryCatalog::new());
        let cache = Arc::new(MemoryCache::new());
        let recommender = Recommender::new(catalog, cache);

        let summary = RefreshJob::new(&recommender, RefreshOptions::default())
            .run()
            .unwrap();

        assert_eq!(summary.users_warmed, 0);
        assert_eq!(summary.products_cached, 0);
        assert!(summary.cold_start_cached);
    }
}
