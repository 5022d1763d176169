//! Site-wide trending aggregation.
//!
//! Recent activity inside a window is reduced to one score per product:
//! likes at 1x, qualifying purchase lines at 3x, and reviews at
//! count x average recent rating. The hybrid blend consumes a 7-day window;
//! cold start uses 14 days.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::catalog::{CatalogStore, ProductId};
use crate::error::Result;
use crate::types::ScoreAccumulator;

/// Per-like weight in the trending window.
const LIKE_WEIGHT: f64 = 1.0;

/// Per-purchased-line weight in the trending window.
const PURCHASE_WEIGHT: f64 = 3.0;

/// Site-wide trending engine.
pub struct TrendingAggregator {
    store: Arc<dyn CatalogStore>,
}

impl TrendingAggregator {
    /// Create an aggregator over the given store.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Products trending over the last `days`, descending by score.
    pub fn trending_products(
        &self,
        days: i64,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<(ProductId, f64)>> {
        let cutoff = now - Duration::days(days);
        let mut accumulator = ScoreAccumulator::new();

        for like in self.store.likes()? {
            if like.created_at >= cutoff {
                accumulator.add(like.product_id, LIKE_WEIGHT);
            }
        }

        for order in self.store.orders()? {
            if !order.status.is_purchase() || order.created_at < cutoff {
                continue;
            }
            for line in self.store.order_lines(order.id)? {
                accumulator.add(line.product_id, PURCHASE_WEIGHT);
            }
        }

        // Reviews contribute count x average recent rating per product.
        let mut review_stats: BTreeMap<ProductId, (usize, f64)> = BTreeMap::new();
        for review in self.store.reviews()? {
            if review.created_at >= cutoff {
                let entry = review_stats.entry(review.product_id).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += review.rating as f64;
            }
        }
        for (product_id, (count, rating_sum)) in review_stats {
            let average = rating_sum / count as f64;
            accumulator.add(product_id, count as f64 * average);
        }

        Ok(accumulator.into_ranked(limit))
    }

    /// Trending product ids only, in rank order.
    pub fn trending_ids(
        &self,
        days: i64,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProductId>> {
        Ok(self
            .trending_products(days, limit, now)?
            .into_iter()
            .map(|(product_id, _)| product_id)
            .collect())
    }
}
