//! Collaborative filtering engines.
//!
//! User-based: find users whose interaction vectors agree on at least two
//! shared products, then surface what they scored highly. Item-based: count
//! how often product pairs land in the same order and recommend the heaviest
//! co-occurring partners of the user's history. Item scores stay raw
//! co-occurrence counts; no normalization is applied.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;

use crate::catalog::{CatalogStore, ProductId, UserId};
use crate::error::Result;
use crate::interaction::{InteractionExtractor, InteractionMatrix};
use crate::types::{ScoreAccumulator, ScoredCandidate, SourceTag};

/// Candidate pairs must share at least this many interacted products.
pub const MIN_COMMON_PRODUCTS: usize = 2;

/// Similar users must exceed this cosine similarity.
pub const USER_SIMILARITY_FLOOR: f64 = 0.3;

/// How many similar users feed the user-based aggregation.
const SIMILAR_USER_FANOUT: usize = 15;

/// Collaborative filtering engine.
pub struct CollaborativeRecommender {
    store: Arc<dyn CatalogStore>,
    extractor: InteractionExtractor,
}

impl CollaborativeRecommender {
    /// Create an engine over the given store.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            extractor: InteractionExtractor::new(store.clone()),
            store,
        }
    }

    /// Users with interaction vectors similar to the subject's.
    ///
    /// Similarity is cosine over the shared-product subspace only, computed
    /// for candidates sharing at least [`MIN_COMMON_PRODUCTS`] products and
    /// kept when it exceeds [`USER_SIMILARITY_FLOOR`]. A subject with no
    /// interactions yields an empty list.
    pub fn find_similar_users(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<(UserId, f64)>> {
        let matrix = self.extractor.user_product_interactions(None)?;
        Ok(Self::similar_users_in(&matrix, user, top_n))
    }

    fn similar_users_in(
        matrix: &InteractionMatrix,
        user: UserId,
        top_n: usize,
    ) -> Vec<(UserId, f64)> {
        let Some(target) = matrix.get(&user) else {
            return Vec::new();
        };
        if target.is_empty() {
            return Vec::new();
        }

        // Scan candidates in ascending id order so score ties rank
        // deterministically.
        let mut candidates: Vec<UserId> = matrix.keys().copied().collect();
        candidates.sort_unstable();

        let mut similarities = Vec::new();
        for other in candidates {
            if other == user {
                continue;
            }
            let products = &matrix[&other];
            if products.is_empty() {
                continue;
            }

            let mut common: Vec<ProductId> = target
                .keys()
                .filter(|pid| products.contains_key(*pid))
                .copied()
                .collect();
            if common.len() < MIN_COMMON_PRODUCTS {
                continue;
            }
            common.sort_unstable();

            let target_vector: Vec<f64> = common.iter().map(|pid| target[pid]).collect();
            let other_vector: Vec<f64> = common.iter().map(|pid| products[pid]).collect();

            let similarity = cosine(&target_vector, &other_vector);
            if similarity > USER_SIMILARITY_FLOOR {
                similarities.push((other, similarity));
            }
        }

        similarities.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        similarities.truncate(top_n);
        similarities
    }

    /// User-based collaborative recommendations.
    ///
    /// Products the top similar users interacted with, weighted by each
    /// user's similarity times their interaction score, summed per product,
    /// excluding the subject's own history.
    pub fn user_based_recommendations(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let matrix = self.extractor.user_product_interactions(None)?;
        let similar_users = Self::similar_users_in(&matrix, user, SIMILAR_USER_FANOUT);
        if similar_users.is_empty() {
            return Ok(Vec::new());
        }

        let history = self.extractor.user_history(user)?;

        let mut accumulator = ScoreAccumulator::new();
        for (similar_user, similarity) in similar_users {
            let Some(products) = matrix.get(&similar_user) else {
                continue;
            };
            let mut product_ids: Vec<ProductId> = products.keys().copied().collect();
            product_ids.sort_unstable();

            for product_id in product_ids {
                if !history.contains(product_id) {
                    accumulator.add(product_id, similarity * products[&product_id]);
                }
            }
        }

        Ok(accumulator
            .into_ranked(top_n)
            .into_iter()
            .map(|(product_id, score)| ScoredCandidate {
                product_id,
                score,
                source: SourceTag::CollaborativeFiltering,
            })
            .collect())
    }

    /// Item-based collaborative recommendations from order co-occurrence.
    ///
    /// Every pair of products within the same qualifying order increments a
    /// symmetric counter; a candidate's score is the summed co-occurrence
    /// count against the user's history.
    pub fn item_based_recommendations(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let history = self.extractor.user_history(user)?;
        if history.is_empty() {
            return Ok(Vec::new());
        }

        let cooccurrence = self.product_cooccurrence()?;

        let mut owned: Vec<ProductId> = history.all.iter().copied().collect();
        owned.sort_unstable();

        let mut accumulator = ScoreAccumulator::new();
        for product_id in owned {
            let Some(related) = cooccurrence.get(&product_id) else {
                continue;
            };
            for (&other, &count) in related {
                if !history.contains(other) {
                    accumulator.add(other, count as f64);
                }
            }
        }

        Ok(accumulator
            .into_ranked(top_n)
            .into_iter()
            .map(|(product_id, score)| ScoredCandidate {
                product_id,
                score,
                source: SourceTag::ItemBasedCf,
            })
            .collect())
    }

    /// Symmetric co-occurrence counts over all qualifying orders.
    fn product_cooccurrence(
        &self,
    ) -> Result<AHashMap<ProductId, BTreeMap<ProductId, u64>>> {
        let mut counts: AHashMap<ProductId, BTreeMap<ProductId, u64>> = AHashMap::new();

        for order in self.store.orders()? {
            if !order.status.is_purchase() {
                continue;
            }
            let products: Vec<ProductId> = self
                .store
                .order_lines(order.id)?
                .into_iter()
                .map(|line| line.product_id)
                .collect();

            for (i, &first) in products.iter().enumerate() {
                for &second in &products[i + 1..] {
                    *counts.entry(first).or_default().entry(second).or_insert(0) += 1;
                    *counts.entry(second).or_default().entry(first).or_insert(0) += 1;
                }
            }
        }

        Ok(counts)
    }
}

/// Cosine similarity between two dense vectors of equal length.
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
