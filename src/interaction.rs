//! User-product interaction extraction.
//!
//! Raw catalog events (likes, qualifying purchases, reviews) are reduced to a
//! single non-negative affinity score per (user, product) pair:
//!
//! - like: +1.0 per record
//! - purchase: +3.0 per order line in a confirmed/processing/shipped/delivered
//!   order
//! - review: +(rating / 5.0) * 2.0 per review, repeat reviews summed
//!
//! A pair with no events has no entry at all. The purchase weight is applied
//! per order line and deliberately ignores the line's `quantity` field; see
//! the pinning test at the bottom of this file.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::catalog::{CatalogStore, ProductId, UserId};
use crate::error::Result;

/// Score contribution of a single like event.
pub const LIKE_WEIGHT: f64 = 1.0;

/// Score contribution of a single qualifying order line.
pub const PURCHASE_WEIGHT: f64 = 3.0;

/// Score contribution of a 5-star review; lower ratings scale linearly.
pub const REVIEW_WEIGHT: f64 = 2.0;

/// Interaction scores for one user, keyed by product.
pub type InteractionMap = AHashMap<ProductId, f64>;

/// Interaction scores for a set of users.
pub type InteractionMatrix = AHashMap<UserId, InteractionMap>;

/// A user's interaction history split by event type.
#[derive(Debug, Clone, Default)]
pub struct UserHistory {
    /// Products the user liked.
    pub liked: AHashSet<ProductId>,
    /// Products the user purchased in a qualifying order.
    pub purchased: AHashSet<ProductId>,
    /// Products the user reviewed.
    pub reviewed: AHashSet<ProductId>,
    /// Union of the three sets.
    pub all: AHashSet<ProductId>,
}

impl UserHistory {
    /// Whether the user has interacted with anything at all.
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Whether the user has already interacted with the product.
    pub fn contains(&self, product: ProductId) -> bool {
        self.all.contains(&product)
    }
}

/// Derives weighted interaction scores and history sets from the store.
pub struct InteractionExtractor {
    store: Arc<dyn CatalogStore>,
}

impl InteractionExtractor {
    /// Create an extractor over the given store.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Build the interaction matrix for one user, or for every known user
    /// when `user` is `None` (the expensive batch path).
    pub fn user_product_interactions(
        &self,
        user: Option<UserId>,
    ) -> Result<InteractionMatrix> {
        let users = match user {
            Some(uid) => vec![uid],
            None => self.store.user_ids()?,
        };

        let mut matrix = InteractionMatrix::default();
        for uid in users {
            let scores = self.interactions_for(uid)?;
            if !scores.is_empty() {
                matrix.insert(uid, scores);
            }
        }
        Ok(matrix)
    }

    /// Accumulated interaction scores for a single user.
    ///
    /// An unknown or inactive user yields an empty map.
    pub fn interactions_for(&self, user: UserId) -> Result<InteractionMap> {
        let mut scores = InteractionMap::default();

        for like in self.store.likes_by_user(user)? {
            *scores.entry(like.product_id).or_insert(0.0) += LIKE_WEIGHT;
        }

        for product_id in self.purchased_lines(user)? {
            *scores.entry(product_id).or_insert(0.0) += PURCHASE_WEIGHT;
        }

        for review in self.store.reviews_by_user(user)? {
            let weight = (review.rating as f64 / 5.0) * REVIEW_WEIGHT;
            *scores.entry(review.product_id).or_insert(0.0) += weight;
        }

        Ok(scores)
    }

    /// The user's interaction history as per-type product sets.
    pub fn user_history(&self, user: UserId) -> Result<UserHistory> {
        let liked: AHashSet<ProductId> = self
            .store
            .likes_by_user(user)?
            .into_iter()
            .map(|l| l.product_id)
            .collect();

        let purchased: AHashSet<ProductId> =
            self.purchased_lines(user)?.into_iter().collect();

        let reviewed: AHashSet<ProductId> = self
            .store
            .reviews_by_user(user)?
            .into_iter()
            .map(|r| r.product_id)
            .collect();

        let mut all = liked.clone();
        all.extend(purchased.iter().copied());
        all.extend(reviewed.iter().copied());

        Ok(UserHistory {
            liked,
            purchased,
            reviewed,
            all,
        })
    }

    /// Product ids from the user's qualifying order lines, one entry per line.
    fn purchased_lines(&self, user: UserId) -> Result<Vec<ProductId>> {
        let mut products = Vec::new();
        for order in self.store.orders_by_user(user)? {
            if !order.status.is_purchase() {
                continue;
            }
            for line in self.store.order_lines(order.id)? {
                products.push(line.product_id);
            }
        }
        Ok(products)
    }
}
