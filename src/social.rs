//! Social-graph recommendation signals.
//!
//! The friend set is who the subject follows, one-directional. Friends'
//! interaction scores propagate to the subject at a discount, with a recency
//! boost for likes inside a 30-day window; a separate 7-day view counts what
//! is trending among friends right now.

use std::sync::Arc;

use ahash::AHashSet;
use chrono::{DateTime, Duration, Utc};

use crate::catalog::{CatalogStore, ProductId, UserId};
use crate::error::Result;
use crate::interaction::InteractionExtractor;
use crate::types::{ScoreAccumulator, ScoredCandidate, SourceTag};

/// Friends' interaction scores count at this fraction of the subject's own.
pub const SOCIAL_DISCOUNT: f64 = 0.7;

/// Additive boost per friend like within the recency window.
pub const RECENT_LIKE_BOOST: f64 = 0.3;

/// Window for the recency boost on friend likes.
pub const RECENCY_WINDOW_DAYS: i64 = 30;

/// Window for trending-among-friends aggregation.
pub const FRIENDS_TRENDING_WINDOW_DAYS: i64 = 7;

/// Per-like weight in the friends-trending window.
pub const TRENDING_LIKE_WEIGHT: f64 = 2.0;

/// Per-purchased-line weight in the friends-trending window.
pub const TRENDING_PURCHASE_WEIGHT: f64 = 5.0;

/// Social propagation engine.
pub struct SocialRecommender {
    store: Arc<dyn CatalogStore>,
    extractor: InteractionExtractor,
}

impl SocialRecommender {
    /// Create an engine over the given store.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            extractor: InteractionExtractor::new(store.clone()),
            store,
        }
    }

    /// Products the subject's friends interacted with, discounted and
    /// recency-boosted.
    ///
    /// Each friend's interaction score contributes at
    /// [`SOCIAL_DISCOUNT`] weight; friend likes within the last 30 days add
    /// [`RECENT_LIKE_BOOST`] per like on top of the discounted base. The
    /// subject's own history is excluded. No friends means no results.
    pub fn friends_recommendations(
        &self,
        user: UserId,
        top_n: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>> {
        let friends = self.store.following(user)?;
        if friends.is_empty() {
            return Ok(Vec::new());
        }

        let history = self.extractor.user_history(user)?;
        let mut accumulator = ScoreAccumulator::new();

        for &friend in &friends {
            let interactions = self.extractor.interactions_for(friend)?;
            let mut product_ids: Vec<ProductId> = interactions.keys().copied().collect();
            product_ids.sort_unstable();

            for product_id in product_ids {
                if !history.contains(product_id) {
                    accumulator.add(product_id, interactions[&product_id] * SOCIAL_DISCOUNT);
                }
            }
        }

        let friend_set: AHashSet<UserId> = friends.iter().copied().collect();
        let cutoff = now - Duration::days(RECENCY_WINDOW_DAYS);
        for like in self.store.likes()? {
            if friend_set.contains(&like.user_id)
                && like.created_at >= cutoff
                && !history.contains(like.product_id)
            {
                accumulator.add(like.product_id, RECENT_LIKE_BOOST);
            }
        }

        Ok(accumulator
            .into_ranked(top_n)
            .into_iter()
            .map(|(product_id, score)| ScoredCandidate {
                product_id,
                score,
                source: SourceTag::Social,
            })
            .collect())
    }

    /// Products trending among the subject's friends over the last 7 days.
    ///
    /// Friend likes weigh [`TRENDING_LIKE_WEIGHT`], friend purchases
    /// [`TRENDING_PURCHASE_WEIGHT`] per qualifying order line; scores are
    /// raw weighted counts. Owned products are excluded.
    pub fn trending_among_friends(
        &self,
        user: UserId,
        top_n: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>> {
        let friends: AHashSet<UserId> =
            self.store.following(user)?.into_iter().collect();
        if friends.is_empty() {
            return Ok(Vec::new());
        }

        let history = self.extractor.user_history(user)?;
        let cutoff = now - Duration::days(FRIENDS_TRENDING_WINDOW_DAYS);
        let mut accumulator = ScoreAccumulator::new();

        for like in self.store.likes()? {
            if friends.contains(&like.user_id)
                && like.created_at >= cutoff
                && !history.contains(like.product_id)
            {
                accumulator.add(like.product_id, TRENDING_LIKE_WEIGHT);
            }
        }

        for order in self.store.orders()? {
            if !friends.contains(&order.user_id)
                || !order.status.is_purchase()
                || order.created_at < cutoff
            {
                continue;
            }
            for line in self.store.order_lines(order.id)? {
                if !history.contains(line.product_id) {
                    accumulator.add(line.product_id, TRENDING_PURCHASE_WEIGHT);
                }
            }
        }

        Ok(accumulator
            .into_ranked(top_n)
            .into_iter()
            .map(|(product_id, score)| ScoredCandidate {
                product_id,
                score,
                source: SourceTag::FriendsTrending,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::catalog::memory::MemoryCatalog;
    use crate::catalog::{Follow, Like, Order, OrderLine, OrderStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    fn follow(catalog: &MemoryCatalog, follower: UserId, following: UserId) {
        catalog
            .add_follow(Follow {
                follower,
                following,
            })
            .unwrap();
    }

    fn like_at(catalog: &MemoryCatalog, user: UserId, product: ProductId, at: DateTime<Utc>) {
        catalog.add_like(Like {
            user_id: user,
            product_id: product,
            created_at: at,
        });
    }

    fn engine(catalog: Arc<MemoryCatalog>) -> SocialRecommender {
        SocialRecommender::new(catalog)
    }

    #[test]
    fn test_recency_boost_is_additive() {
        let catalog = Arc::new(MemoryCatalog::new());
        follow(&catalog, 1, 2);
        // Fresh like: discounted base 0.7 plus recency boost 0.3.
        like_at(&catalog, 2, 10, days_ago(5));
        // Stale like: discounted base only.
        like_at(&catalog, 2, 11, days_ago(90));

        let recs = engine(catalog).friends_recommendations(1, 10, now()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].product_id, 10);
        assert!((recs[0].score - 1.0).abs() < 1e-12);
        assert_eq!(recs[1].product_id, 11);
        assert!((recs[1].score - 0.7).abs() < 1e-12);
        assert_eq!(recs[0].source, SourceTag::Social);
    }

    #[test]
    fn test_own_history_excluded_from_social() {
        let catalog = Arc::new(MemoryCatalog::new());
        follow(&catalog, 1, 2);
        like_at(&catalog, 2, 10, days_ago(2));
        like_at(&catalog, 1, 10, days_ago(1));

        let recs = engine(catalog).friends_recommendations(1, 10, now()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_follows_are_one_directional() {
        let catalog = Arc::new(MemoryCatalog::new());
        // User 2 follows user 1, not the other way around.
        follow(&catalog, 2, 1);
        like_at(&catalog, 2, 10, days_ago(2));

        let recs = engine(catalog).friends_recommendations(1, 10, now()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_no_friends_yields_empty() {
        let catalog = Arc::new(MemoryCatalog::new());
        like_at(&catalog, 2, 10, days_ago(2));

        let social = engine(catalog);
        assert!(social.friends_recommendations(1, 10, now()).unwrap().is_empty());
        assert!(social.trending_among_friends(1, 10, now()).unwrap().is_empty());
    }

    #[test]
    fn test_friends_trending_weights() {
        let catalog = Arc::new(MemoryCatalog::new());
        follow(&catalog, 1, 2);
        follow(&catalog, 1, 3);
        // Product 10: one like (2.0) and one purchase (5.0) inside the
        // window. Product 11: one like outside the window.
        like_at(&catalog, 2, 10, days_ago(3));
        like_at(&catalog, 3, 11, days_ago(10));
        catalog.add_order(
            Order {
                id: 1,
                user_id: 3,
                status: OrderStatus::Shipped,
                created_at: days_ago(2),
            },
            vec![OrderLine {
                order_id: 1,
                product_id: 10,
                quantity: 1,
            }],
        );

        let recs = engine(catalog).trending_among_friends(1, 10, now()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].product_id, 10);
        assert_eq!(recs[0].score, 7.0);
        assert_eq!(recs[0].source, SourceTag::FriendsTrending);
    }

    #[test]
    fn test_friends_trending_excludes_pending_orders() {
        let catalog = Arc::new(MemoryCatalog::new());
        follow(&catalog, 1, 2);
        catalog.add_order(
            Order {
                id: 1,
                user_id: 2,
                status: OrderStatus::Pending,
                created_at: days_ago(1),
            },
            vec![OrderLine {
                order_id: 1,
                product_id: 10,
                quantity: 1,
            }],
        );

        let recs = engine(catalog).trending_among_friends(1, 10, now()).unwrap();
        assert!(recs.is_empty());
    }
}
