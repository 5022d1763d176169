//! The `Recommender` facade tying the engines, vector service, and result
//! cache together.
//!
//! This is the surface an HTTP layer or batch job talks to. Reads consult
//! the cache only for limits enumerated in [`CacheLimits`]; anything else is
//! computed fresh. Cache failures of any kind degrade to recomputation and a
//! warning log line, never an error to the caller. Warming returns a plain
//! success flag for the same reason.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{
    self, CacheLimits, COLD_START_TTL, FRIENDS_TRENDING_TTL, KeyValueCache, PERSONALIZED_TTL,
    SIMILAR_PRODUCTS_TTL,
};
use crate::catalog::{CatalogStore, ProductId, UserId};
use crate::collaborative::CollaborativeRecommender;
use crate::content::ContentRecommender;
use crate::error::Result;
use crate::feature::{FeatureVectorService, VectorizerConfig};
use crate::hybrid::{FusionWeights, HybridRecommender};
use crate::interaction::{InteractionExtractor, InteractionMatrix, UserHistory};
use crate::social::SocialRecommender;
use crate::stats::{RecommendationStats, recommendation_stats};
use crate::types::{Recommendations, ScoredCandidate, SimilarProduct};

/// Tunable configuration for a [`Recommender`].
#[derive(Debug, Clone, Default)]
pub struct RecommenderConfig {
    /// Hybrid fusion weights.
    pub weights: FusionWeights,
    /// Enumerated cacheable limits.
    pub limits: CacheLimits,
    /// TF-IDF vectorizer settings.
    pub vectorizer: VectorizerConfig,
}

/// Facade over every recommendation operation.
pub struct Recommender {
    store: Arc<dyn CatalogStore>,
    cache: Arc<dyn KeyValueCache>,
    vectors: Arc<FeatureVectorService>,
    limits: CacheLimits,
    extractor: InteractionExtractor,
    content: ContentRecommender,
    collaborative: CollaborativeRecommender,
    social: SocialRecommender,
    hybrid: HybridRecommender,
}

impl Recommender {
    /// Create a recommender with default configuration.
    pub fn new(store: Arc<dyn CatalogStore>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self::with_config(store, cache, RecommenderConfig::default())
    }

    /// Create a recommender with custom configuration.
    pub fn with_config(
        store: Arc<dyn CatalogStore>,
        cache: Arc<dyn KeyValueCache>,
        config: RecommenderConfig,
    ) -> Self {
        let vectors = Arc::new(FeatureVectorService::with_config(
            store.clone(),
            config.vectorizer,
        ));
        Self {
            extractor: InteractionExtractor::new(store.clone()),
            content: ContentRecommender::new(store.clone(), vectors.clone()),
            collaborative: CollaborativeRecommender::new(store.clone()),
            social: SocialRecommender::new(store.clone()),
            hybrid: HybridRecommender::with_weights(
                store.clone(),
                vectors.clone(),
                config.weights,
            ),
            limits: config.limits,
            vectors,
            store,
            cache,
        }
    }

    /// The shared feature-vector service (for explicit rebuild triggers).
    pub fn feature_vectors(&self) -> &Arc<FeatureVectorService> {
        &self.vectors
    }

    /// The underlying catalog store.
    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Refit the feature vector space from the current catalog.
    ///
    /// Returns whether a space was fitted (false on an empty catalog).
    pub fn rebuild_feature_vectors(&self) -> Result<bool> {
        Ok(self.vectors.rebuild()?.is_some())
    }

    /// Weighted interaction matrix; see
    /// [`InteractionExtractor::user_product_interactions`].
    pub fn user_product_interactions(
        &self,
        user: Option<UserId>,
    ) -> Result<InteractionMatrix> {
        self.extractor.user_product_interactions(user)
    }

    /// A user's interaction history sets.
    pub fn user_history(&self, user: UserId) -> Result<UserHistory> {
        self.extractor.user_history(user)
    }

    /// Products similar to the given product, cached for enumerated limits.
    pub fn similar_products(
        &self,
        product: ProductId,
        top_n: usize,
    ) -> Result<Vec<SimilarProduct>> {
        let cacheable = self.limits.similar_products.contains(&top_n);
        let key = cache::similar_products_key(product, top_n);
        if cacheable && let Some(hit) = self.cache_read::<Vec<SimilarProduct>>(&key) {
            return Ok(hit);
        }

        let similar = self.content.similar_products(product, top_n)?;
        if cacheable {
            self.cache_write(&key, &similar, SIMILAR_PRODUCTS_TTL);
        }
        Ok(similar)
    }

    /// Content-based recommendations from the user's history.
    pub fn content_recommendations(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        self.content.recommendations_for_user(user, top_n)
    }

    /// Users with similar interaction vectors.
    pub fn find_similar_users(&self, user: UserId, top_n: usize) -> Result<Vec<(UserId, f64)>> {
        self.collaborative.find_similar_users(user, top_n)
    }

    /// User-based collaborative recommendations.
    pub fn user_based_recommendations(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        self.collaborative.user_based_recommendations(user, top_n)
    }

    /// Item-based collaborative recommendations.
    pub fn item_based_recommendations(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        self.collaborative.item_based_recommendations(user, top_n)
    }

    /// Friends' discounted interactions with recency boost.
    pub fn friends_recommendations(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        self.social.friends_recommendations(user, top_n, Utc::now())
    }

    /// Trending among friends, cached for enumerated limits.
    pub fn friends_trending(&self, user: UserId, top_n: usize) -> Result<Vec<ScoredCandidate>> {
        let cacheable = self.limits.friends_trending.contains(&top_n);
        let key = cache::friends_trending_key(user, top_n);
        if cacheable && let Some(hit) = self.cache_read::<Vec<ScoredCandidate>>(&key) {
            return Ok(hit);
        }

        let trending = self.social.trending_among_friends(user, top_n, Utc::now())?;
        if cacheable {
            self.cache_write(&key, &trending, FRIENDS_TRENDING_TTL);
        }
        Ok(trending)
    }

    /// Personalized hybrid recommendations, bypassing the cache.
    pub fn personalized_recommendations(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Recommendations> {
        self.hybrid.personalized(user, top_n, Utc::now())
    }

    /// Cold-start recommendations, cached for enumerated limits.
    pub fn cold_start_recommendations(&self, top_n: usize) -> Result<Recommendations> {
        let cacheable = self.limits.cold_start.contains(&top_n);
        let key = cache::cold_start_key(top_n);
        if cacheable && let Some(hit) = self.cache_read::<Recommendations>(&key) {
            return Ok(hit);
        }

        let recommendations = self.hybrid.cold_start(top_n, Utc::now())?;
        if cacheable {
            self.cache_write(&key, &recommendations, COLD_START_TTL);
        }
        Ok(recommendations)
    }

    /// Recommendations for a user, dispatching to cold start when the user
    /// has no interaction history. Cached for enumerated limits under the
    /// user's personalized key.
    pub fn recommend(&self, user: UserId, top_n: usize) -> Result<Recommendations> {
        let cacheable = self.limits.personalized.contains(&top_n);
        let key = cache::personalized_key(user, top_n);
        if cacheable && let Some(hit) = self.cache_read::<Recommendations>(&key) {
            return Ok(hit);
        }

        let recommendations = self.compute_for_user(user, top_n)?;
        if cacheable {
            self.cache_write(&key, &recommendations, PERSONALIZED_TTL);
        }
        Ok(recommendations)
    }

    /// Purge every cached recommendation variant for a user.
    ///
    /// Call after any like/unlike, follow/unfollow, or review event by the
    /// user. Only the enumerated limits are purged; nothing else was ever
    /// cached.
    pub fn invalidate_user(&self, user: UserId) {
        for &limit in &self.limits.personalized {
            self.cache_delete(&cache::personalized_key(user, limit));
        }
        for &limit in &self.limits.friends_trending {
            self.cache_delete(&cache::friends_trending_key(user, limit));
        }
    }

    /// Purge cached similar-product variants for a product.
    ///
    /// Call when product details change significantly.
    pub fn invalidate_product(&self, product: ProductId) {
        for &limit in &self.limits.similar_products {
            self.cache_delete(&cache::similar_products_key(product, limit));
        }
    }

    /// Precompute and cache a user's recommendations for every enumerated
    /// limit. Any failure is logged and reported as `false`.
    pub fn warm_user(&self, user: UserId) -> bool {
        for &limit in &self.limits.personalized {
            match self.compute_for_user(user, limit) {
                Ok(recommendations) => self.cache_write(
                    &cache::personalized_key(user, limit),
                    &recommendations,
                    PERSONALIZED_TTL,
                ),
                Err(e) => {
                    warn!("warming recommendations for user {user} failed: {e}");
                    return false;
                }
            }
        }
        true
    }

    /// Precompute and cache the shared cold-start lists.
    pub fn warm_cold_start(&self) -> bool {
        for &limit in &self.limits.cold_start {
            match self.hybrid.cold_start(limit, Utc::now()) {
                Ok(recommendations) => self.cache_write(
                    &cache::cold_start_key(limit),
                    &recommendations,
                    COLD_START_TTL,
                ),
                Err(e) => {
                    warn!("warming cold-start recommendations failed: {e}");
                    return false;
                }
            }
        }
        true
    }

    /// Precompute and cache a product's similar-product lists.
    pub fn warm_product(&self, product: ProductId) -> bool {
        for &limit in &self.limits.similar_products {
            match self.content.similar_products(product, limit) {
                Ok(similar) => self.cache_write(
                    &cache::similar_products_key(product, limit),
                    &similar,
                    SIMILAR_PRODUCTS_TTL,
                ),
                Err(e) => {
                    warn!("warming similar products for product {product} failed: {e}");
                    return false;
                }
            }
        }
        true
    }

    /// Site-wide trending products over the given window.
    pub fn trending_products(
        &self,
        days: i64,
        limit: usize,
    ) -> Result<Vec<(ProductId, f64)>> {
        crate::trending::TrendingAggregator::new(self.store.clone())
            .trending_products(days, limit, Utc::now())
    }

    /// Corpus statistics.
    pub fn stats(&self) -> Result<RecommendationStats> {
        recommendation_stats(self.store.as_ref())
    }

    fn compute_for_user(&self, user: UserId, top_n: usize) -> Result<Recommendations> {
        let history = self.extractor.user_history(user)?;
        if history.is_empty() {
            self.hybrid.cold_start(top_n, Utc::now())
        } else {
            self.hybrid.personalized(user, top_n, Utc::now())
        }
    }

    fn cache_read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("discarding undecodable cache payload for {key}: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("cache read for {key} failed: {e}");
                None
            }
        }
    }

    fn cache_write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("serializing cache payload for {key} failed: {e}");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, payload, ttl) {
            warn!("cache write for {key} failed: {e}");
        }
    }

    fn cache_delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key) {
            warn!("cache delete for {key} failed: {e}");
        }
    }
}
