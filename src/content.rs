//! Content-based filtering over the TF-IDF feature space.
//!
//! "Products like X" comes straight from cosine similarity between feature
//! rows; per-user content recommendations weight each similar product by the
//! user's interaction strength for the product that surfaced it, summed
//! across the whole history.

use std::sync::Arc;

use crate::catalog::{CatalogStore, ProductId, UserId};
use crate::error::Result;
use crate::feature::FeatureVectorService;
use crate::interaction::InteractionExtractor;
use crate::types::{ScoreAccumulator, ScoredCandidate, SimilarProduct, SourceTag};

/// Results at or below this cosine similarity are dropped, even when that
/// leaves fewer than `top_n` results.
pub const SIMILARITY_FLOOR: f64 = 0.1;

/// How many similar products each history item contributes to the per-user
/// aggregation.
const SOURCE_FANOUT: usize = 15;

/// Content-based recommendation engine.
pub struct ContentRecommender {
    vectors: Arc<FeatureVectorService>,
    extractor: InteractionExtractor,
}

impl ContentRecommender {
    /// Create an engine over the given store and fitted-vector service.
    pub fn new(store: Arc<dyn CatalogStore>, vectors: Arc<FeatureVectorService>) -> Self {
        Self {
            vectors,
            extractor: InteractionExtractor::new(store),
        }
    }

    /// Products most similar to the given product.
    ///
    /// The product itself is excluded, results are descending by similarity,
    /// and anything at or below [`SIMILARITY_FLOOR`] is dropped after the
    /// top-n cut. Unknown products and an empty space yield an empty list.
    pub fn similar_products(
        &self,
        product: ProductId,
        top_n: usize,
    ) -> Result<Vec<SimilarProduct>> {
        let Some(space) = self.vectors.get_or_build()? else {
            return Ok(Vec::new());
        };
        let Some(index) = space.position(product) else {
            return Ok(Vec::new());
        };

        let similarities = space.similarities_to(index);
        let mut candidates: Vec<(usize, f64)> = similarities
            .into_iter()
            .enumerate()
            .filter(|&(other, _)| other != index)
            .collect();
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        candidates.truncate(top_n);
        candidates.retain(|&(_, similarity)| similarity > SIMILARITY_FLOOR);

        Ok(candidates
            .into_iter()
            .map(|(other, similarity)| SimilarProduct {
                product_id: space.product_ids()[other],
                similarity,
            })
            .collect())
    }

    /// Content recommendations for a user, aggregated over their history.
    ///
    /// Each history product contributes up to 15 similar products, weighted
    /// by the user's interaction strength for that history product.
    /// Candidates already in the history are excluded. An empty history
    /// yields an empty list; cold start is handled by the hybrid layer.
    pub fn recommendations_for_user(
        &self,
        user: UserId,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let history = self.extractor.user_history(user)?;
        if history.is_empty() {
            return Ok(Vec::new());
        }

        let scores = self.extractor.interactions_for(user)?;

        let mut interacted: Vec<ProductId> = history.all.iter().copied().collect();
        interacted.sort_unstable();

        let mut accumulator = ScoreAccumulator::new();
        for source_product in interacted {
            let weight = scores.get(&source_product).copied().unwrap_or(1.0);
            for similar in self.similar_products(source_product, SOURCE_FANOUT)? {
                if !history.contains(similar.product_id) {
                    accumulator.add(similar.product_id, similar.similarity * weight);
                }
            }
        }

        Ok(accumulator
            .into_ranked(top_n)
            .into_iter()
            .map(|(product_id, score)| ScoredCandidate {
                product_id,
                score,
                source: SourceTag::ContentBased,
            })
            .collect())
    }
}
