//! Shared result types for the recommendation engines.
//!
//! Every signal source emits [`ScoredCandidate`] values tagged with the
//! [`SourceTag`] that produced them; the hybrid blend resolves surviving
//! candidates into [`RankedProduct`] records carrying the union of
//! contributing tags.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductId};

/// The signal source that contributed a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// TF-IDF content similarity to products in the user's history.
    ContentBased,
    /// User-based collaborative filtering.
    CollaborativeFiltering,
    /// Item-based collaborative filtering (order co-occurrence).
    ItemBasedCf,
    /// Friends' interactions, discounted.
    Social,
    /// Trending among the user's friends.
    FriendsTrending,
    /// Site-wide trending.
    Trending,
    /// Highest-average-rating fallback.
    TopRated,
    /// Cold-start marker for subjects with no history.
    ColdStart,
}

impl SourceTag {
    /// Stable wire name for this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::ContentBased => "content_based",
            SourceTag::CollaborativeFiltering => "collaborative_filtering",
            SourceTag::ItemBasedCf => "item_based_cf",
            SourceTag::Social => "social",
            SourceTag::FriendsTrending => "friends_trending",
            SourceTag::Trending => "trending",
            SourceTag::TopRated => "top_rated",
            SourceTag::ColdStart => "cold_start",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate product scored by a single signal source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The recommended product.
    pub product_id: ProductId,
    /// Signal-specific score; higher is better.
    pub score: f64,
    /// The source that produced this candidate.
    pub source: SourceTag,
}

/// A product ranked by content similarity to a reference product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarProduct {
    pub product_id: ProductId,
    /// Cosine similarity in [0, 1].
    pub similarity: f64,
}

/// A fully resolved recommendation with its contributing sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    /// The full product record.
    pub product: Product,
    /// Combined recommendation score, rounded to three decimals.
    pub score: f64,
    /// Every source that contributed to the score, in contribution order.
    pub sources: Vec<SourceTag>,
}

/// An ordered recommendation list plus resolution bookkeeping.
///
/// `dropped` counts ranked identifiers that no longer resolved to a product
/// record at result-assembly time. The drop is an accepted consistency
/// accommodation, but the count stays observable for callers and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub items: Vec<RankedProduct>,
    pub dropped: usize,
}

impl Recommendations {
    /// Whether any recommendations survived.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of recommendations.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Score accumulator that preserves first-insertion order.
///
/// Candidates tie on score regularly (integer co-occurrence counts, identical
/// boosts), and the ranking contract breaks ties by the order candidates were
/// first seen, i.e. stable-sort behavior over the accumulation order. A plain
/// hash map would randomize that, so the accumulator keeps entries in a vector
/// with a side index.
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    index: AHashMap<ProductId, usize>,
    entries: Vec<(ProductId, f64)>,
}

impl ScoreAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the product's running score.
    pub fn add(&mut self, product_id: ProductId, delta: f64) {
        match self.index.get(&product_id) {
            Some(&slot) => self.entries[slot].1 += delta,
            None => {
                self.index.insert(product_id, self.entries.len());
                self.entries.push((product_id, delta));
            }
        }
    }

    /// Current score for a product, if it has been touched.
    pub fn get(&self, product_id: ProductId) -> Option<f64> {
        self.index.get(&product_id).map(|&slot| self.entries[slot].1)
    }

    /// Number of distinct products touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no product has been touched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank by descending score, ties by first insertion, truncated to `top_n`.
    pub fn into_ranked(self, top_n: usize) -> Vec<(ProductId, f64)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        entries.truncate(top_n);
        entries
    }
}
