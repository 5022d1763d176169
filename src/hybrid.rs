//! Hybrid score fusion across the four signal sources.
//!
//! Content, user-based CF, item-based CF, social, and site-wide trending
//! lists are computed independently, linearly combined with fixed weights,
//! and resolved to full product records. Products surfacing in several
//! sources sum their weighted contributions and keep every contributing
//! source tag. Cold start (no interaction history) falls back to a 14-day
//! trending block padded with top-rated products.

use std::sync::Arc;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogStore, ProductId, UserId};
use crate::collaborative::CollaborativeRecommender;
use crate::content::ContentRecommender;
use crate::error::Result;
use crate::feature::FeatureVectorService;
use crate::interaction::InteractionExtractor;
use crate::social::SocialRecommender;
use crate::trending::TrendingAggregator;
use crate::types::{RankedProduct, Recommendations, ScoreAccumulator, ScoredCandidate, SourceTag};

/// Candidates fetched per source before fusion.
const CONTENT_FANOUT: usize = 15;
const USER_CF_FANOUT: usize = 15;
const ITEM_CF_FANOUT: usize = 10;
const SOCIAL_FANOUT: usize = 15;
const TRENDING_FANOUT: usize = 10;

/// Trending window feeding the personalized blend.
const TRENDING_WINDOW_DAYS: i64 = 7;

/// Trending window feeding cold start.
const COLD_START_WINDOW_DAYS: i64 = 14;

/// Positional trending scores scale to this ceiling before weighting.
const TRENDING_POSITION_SCALE: f64 = 10.0;

/// Minimum review count for the top-rated cold-start padding.
const MIN_REVIEWS_FOR_TOP_RATED: usize = 3;

/// Fixed score for cold-start trending entries.
const COLD_START_TRENDING_SCORE: f64 = 1.0;

/// Fixed score for cold-start top-rated padding.
const COLD_START_TOP_RATED_SCORE: f64 = 0.9;

/// Linear fusion weights per signal source.
///
/// The defaults match the production blend; the weights sum to 1.0 but
/// nothing depends on that, they are plain multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Content-based filtering weight.
    pub content: f64,
    /// User-based collaborative filtering weight.
    pub user_cf: f64,
    /// Item-based collaborative filtering weight.
    pub item_cf: f64,
    /// Social propagation weight.
    pub social: f64,
    /// Site-wide trending weight.
    pub trending: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            content: 0.30,
            user_cf: 0.20,
            item_cf: 0.10,
            social: 0.25,
            trending: 0.15,
        }
    }
}

/// Hybrid recommendation engine.
pub struct HybridRecommender {
    store: Arc<dyn CatalogStore>,
    content: ContentRecommender,
    collaborative: CollaborativeRecommender,
    social: SocialRecommender,
    trending: TrendingAggregator,
    weights: FusionWeights,
}

impl HybridRecommender {
    /// Create an engine with the default fusion weights.
    pub fn new(store: Arc<dyn CatalogStore>, vectors: Arc<FeatureVectorService>) -> Self {
        Self::with_weights(store, vectors, FusionWeights::default())
    }

    /// Create an engine with custom fusion weights.
    pub fn with_weights(
        store: Arc<dyn CatalogStore>,
        vectors: Arc<FeatureVectorService>,
        weights: FusionWeights,
    ) -> Self {
        Self {
            content: ContentRecommender::new(store.clone(), vectors),
            collaborative: CollaborativeRecommender::new(store.clone()),
            social: SocialRecommender::new(store.clone()),
            trending: TrendingAggregator::new(store.clone()),
            store,
            weights,
        }
    }

    /// Personalized recommendations for a user with interaction history.
    ///
    /// Cold-start subjects get empty source lists here and should be routed
    /// to [`cold_start`](Self::cold_start) by the caller.
    pub fn personalized(
        &self,
        user: UserId,
        top_n: usize,
        now: DateTime<Utc>,
    ) -> Result<Recommendations> {
        let content = self.content.recommendations_for_user(user, CONTENT_FANOUT)?;
        let user_cf = self
            .collaborative
            .user_based_recommendations(user, USER_CF_FANOUT)?;
        let item_cf = self
            .collaborative
            .item_based_recommendations(user, ITEM_CF_FANOUT)?;
        let social = self
            .social
            .friends_recommendations(user, SOCIAL_FANOUT, now)?;
        // Trending is a global signal; drop the subject's own history from
        // it so no source can recommend a product the user already has.
        let history = InteractionExtractor::new(self.store.clone()).user_history(user)?;
        let trending: Vec<ProductId> = self
            .trending
            .trending_ids(TRENDING_WINDOW_DAYS, TRENDING_FANOUT, now)?
            .into_iter()
            .filter(|&product_id| !history.contains(product_id))
            .collect();

        let mut accumulator = ScoreAccumulator::new();
        let mut sources: AHashMap<ProductId, Vec<SourceTag>> = AHashMap::new();

        let mut blend = |candidates: &[ScoredCandidate], weight: f64| {
            for candidate in candidates {
                accumulator.add(candidate.product_id, candidate.score * weight);
                sources
                    .entry(candidate.product_id)
                    .or_default()
                    .push(candidate.source);
            }
        };

        blend(&content, self.weights.content);
        blend(&user_cf, self.weights.user_cf);
        blend(&item_cf, self.weights.item_cf);
        blend(&social, self.weights.social);

        // Trending has no intrinsic score here; positions decay linearly
        // from the scale ceiling down to scale/n.
        let trending_len = trending.len();
        for (position, product_id) in trending.into_iter().enumerate() {
            let positional = (trending_len - position) as f64 / trending_len as f64
                * TRENDING_POSITION_SCALE;
            accumulator.add(product_id, positional * self.weights.trending);
            sources
                .entry(product_id)
                .or_default()
                .push(SourceTag::Trending);
        }

        let ranked = accumulator.into_ranked(top_n);
        self.resolve(ranked, &mut sources)
    }

    /// Fallback recommendations for subjects with no interaction history.
    ///
    /// A 14-day trending block at score 1.0 comes first; if it falls short
    /// of `top_n`, products with at least three reviews pad the tail at
    /// score 0.9, ordered by average rating then review count. This is two
    /// fixed blocks, not a blended ranking.
    pub fn cold_start(&self, top_n: usize, now: DateTime<Utc>) -> Result<Recommendations> {
        let mut items = Vec::new();
        let mut dropped = 0usize;

        let trending_ids = self
            .trending
            .trending_ids(COLD_START_WINDOW_DAYS, top_n, now)?;
        for product_id in trending_ids {
            match self.store.product(product_id)? {
                Some(product) => items.push(RankedProduct {
                    product,
                    score: COLD_START_TRENDING_SCORE,
                    sources: vec![SourceTag::Trending, SourceTag::ColdStart],
                }),
                None => dropped += 1,
            }
        }

        if items.len() < top_n {
            let included: Vec<ProductId> = items.iter().map(|r| r.product.id).collect();
            for product in self.top_rated_products(&included, top_n - items.len())? {
                items.push(RankedProduct {
                    product,
                    score: COLD_START_TOP_RATED_SCORE,
                    sources: vec![SourceTag::TopRated, SourceTag::ColdStart],
                });
            }
        }

        items.truncate(top_n);
        if dropped > 0 {
            warn!("cold start dropped {dropped} unresolvable trending products");
        }
        Ok(Recommendations { items, dropped })
    }

    /// Highest-average-rating products with enough reviews, excluding
    /// already-included ids.
    fn top_rated_products(
        &self,
        excluded: &[ProductId],
        limit: usize,
    ) -> Result<Vec<crate::catalog::Product>> {
        let mut review_stats: AHashMap<ProductId, (usize, f64)> = AHashMap::new();
        for review in self.store.reviews()? {
            let entry = review_stats.entry(review.product_id).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += review.rating as f64;
        }

        let mut rated: Vec<(crate::catalog::Product, f64, usize)> = Vec::new();
        for product in self.store.products()? {
            if excluded.contains(&product.id) {
                continue;
            }
            if let Some(&(count, rating_sum)) = review_stats.get(&product.id)
                && count >= MIN_REVIEWS_FOR_TOP_RATED
            {
                rated.push((product, rating_sum / count as f64, count));
            }
        }

        rated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| b.2.cmp(&a.2)));
        rated.truncate(limit);
        Ok(rated.into_iter().map(|(product, _, _)| product).collect())
    }

    /// Resolve ranked ids into product records, counting unresolvable ids.
    fn resolve(
        &self,
        ranked: Vec<(ProductId, f64)>,
        sources: &mut AHashMap<ProductId, Vec<SourceTag>>,
    ) -> Result<Recommendations> {
        let mut items = Vec::with_capacity(ranked.len());
        let mut dropped = 0usize;

        for (product_id, score) in ranked {
            match self.store.product(product_id)? {
                Some(product) => items.push(RankedProduct {
                    product,
                    score: (score * 1000.0).round() / 1000.0,
                    sources: sources.remove(&product_id).unwrap_or_default(),
                }),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("recommendation resolution dropped {dropped} unresolvable products");
        }
        Ok(Recommendations { items, dropped })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::catalog::memory::MemoryCatalog;
    use crate::catalog::{Follow, Like, Product, Review};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

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

    fn engine(catalog: Arc<MemoryCatalog>) -> HybridRecommender {
        let vectors = Arc::new(FeatureVectorService::new(catalog.clone()));
        HybridRecommender::new(catalog, vectors)
    }

    #[test]
    fn test_fusion_sums_weighted_sources() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.add_product(product(20));
        catalog.add_product(product(30));
        // Social: friend 2 likes product 20 recently -> 0.7 + 0.3 = 1.0.
        catalog
            .add_follow(Follow {
                follower: 1,
                following: 2,
            })
            .unwrap();
        catalog.add_like(Like {
            user_id: 2,
            product_id: 20,
            created_at: days_ago(3),
        });
        // Trending: product 30 has two likes, product 20 one.
        catalog.add_like(Like {
            user_id: 3,
            product_id: 30,
            created_at: days_ago(2),
        });
        catalog.add_like(Like {
            user_id: 4,
            product_id: 30,
            created_at: days_ago(2),
        });

        let recs = engine(catalog).personalized(1, 10, now()).unwrap();

        // Product 30: trending position 0 of 2 -> (2/2)*10*0.15 = 1.5.
        // Product 20: social 1.0*0.25 + trending position 1 -> (1/2)*10*0.15.
        assert_eq!(recs.items.len(), 2);
        assert_eq!(recs.items[0].product.id, 30);
        assert!((recs.items[0].score - 1.5).abs() < 1e-9);
        assert_eq!(recs.items[0].sources, vec![SourceTag::Trending]);

        assert_eq!(recs.items[1].product.id, 20);
        assert!((recs.items[1].score - 1.0).abs() < 1e-9);
        assert_eq!(
            recs.items[1].sources,
            vec![SourceTag::Social, SourceTag::Trending]
        );
        assert_eq!(recs.dropped, 0);
    }

    #[test]
    fn test_personalized_counts_unresolvable_products() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.add_product(product(20));
        // Product 99 trends but has no catalog record.
        catalog.add_like(Like {
            user_id: 3,
            product_id: 99,
            created_at: days_ago(1),
        });
        catalog.add_like(Like {
            user_id: 4,
            product_id: 20,
            created_at: days_ago(1),
        });

        let recs = engine(catalog).personalized(1, 10, now()).unwrap();
        assert_eq!(recs.dropped, 1);
        assert_eq!(recs.items.len(), 1);
        assert_eq!(recs.items[0].product.id, 20);
    }

    #[test]
    fn test_personalized_truncates_to_top_n() {
        let catalog = Arc::new(MemoryCatalog::new());
        for id in 1..=6u64 {
            catalog.add_product(product(id));
            catalog.add_like(Like {
                user_id: 100 + id,
                product_id: id,
                created_at: days_ago(1),
            });
        }

        let recs = engine(catalog).personalized(1, 3, now()).unwrap();
        assert_eq!(recs.items.len(), 3);
    }

    #[test]
    fn test_cold_start_blocks_and_scores() {
        let catalog = Arc::new(MemoryCatalog::new());
        for id in [1, 2, 3] {
            catalog.add_product(product(id));
        }
        // Product 1 trends inside 14 days.
        catalog.add_like(Like {
            user_id: 10,
            product_id: 1,
            created_at: days_ago(10),
        });
        // Product 2 is highly rated with three reviews but no recent
        // activity; product 3 has too few reviews.
        for user in [11, 12, 13] {
            catalog.add_review(Review {
                user_id: user,
                product_id: 2,
                rating: 5,
                created_at: days_ago(100),
            });
        }
        catalog.add_review(Review {
            user_id: 11,
            product_id: 3,
            rating: 5,
            created_at: days_ago(100),
        });

        let recs = engine(catalog).cold_start(5, now()).unwrap();

        assert_eq!(recs.items.len(), 2);
        assert_eq!(recs.items[0].product.id, 1);
        assert_eq!(recs.items[0].score, 1.0);
        assert_eq!(
            recs.items[0].sources,
            vec![SourceTag::Trending, SourceTag::ColdStart]
        );
        assert_eq!(recs.items[1].product.id, 2);
        assert_eq!(recs.items[1].score, 0.9);
        assert_eq!(
            recs.items[1].sources,
            vec![SourceTag::TopRated, SourceTag::ColdStart]
        );
    }

    #[test]
    fn test_cold_start_padding_excludes_trending_block() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.add_product(product(1));
        // Product 1 both trends (recent reviews) and qualifies as top rated;
        // it must not appear twice.
        for user in [11, 12, 13] {
            catalog.add_review(Review {
                user_id: user,
                product_id: 1,
                rating: 5,
                created_at: days_ago(2),
            });
        }

        let recs = engine(catalog).cold_start(5, now()).unwrap();
        assert_eq!(recs.items.len(), 1);
        assert_eq!(recs.items[0].score, 1.0);
    }
}
