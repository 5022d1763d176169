//! Product feature text and TF-IDF vector space.
//!
//! Each product is flattened into a text blob (category, ingredients,
//! benefits, price tier), analyzed into unigram/bigram terms, and fitted
//! into a TF-IDF [`vectorizer::VectorSpace`] capped at 100 vocabulary terms.
//! The fitted space is process-wide state owned by
//! [`service::FeatureVectorService`]: built lazily on first access, refreshed
//! only by an explicit rebuild. Catalog writes do not invalidate it;
//! best-effort staleness is an accepted tradeoff.

pub mod analyzer;
pub mod service;
pub mod vectorizer;

pub use service::FeatureVectorService;
pub use vectorizer::{VectorSpace, VectorizerConfig};

use crate::catalog::Product;

/// Price-tier label for a product price.
pub fn price_tier(price: f64) -> &'static str {
    if price < 20.0 {
        "budget"
    } else if price < 50.0 {
        "mid-range"
    } else {
        "premium"
    }
}

/// Concatenated feature text for a product.
///
/// Category first, then ingredients, then benefits, then the price tier,
/// space-joined. Regenerated on demand; never persisted.
pub fn feature_text(product: &Product) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !product.category.is_empty() {
        parts.push(&product.category);
    }
    for ingredient in &product.ingredients {
        parts.push(ingredient);
    }
    for benefit in &product.benefits {
        parts.push(benefit);
    }
    parts.push(price_tier(product.price));
    parts.join(" ")
}
