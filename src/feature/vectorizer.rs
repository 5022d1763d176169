//! TF-IDF fitting over product feature text.
//!
//! The fitted [`VectorSpace`] holds the selected vocabulary, per-term IDF
//! weights, one L2-normalized sparse row per product, and the parallel
//! product-id list. Row count always equals the product-id list length:
//! both are populated from the same pass over the catalog.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductId};
use crate::feature::{analyzer, feature_text};

/// Configuration for the TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size; the most frequent terms win.
    pub max_terms: usize,
    /// Largest n-gram to generate (1 = unigrams, 2 = unigrams + bigrams).
    pub ngram_max: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_terms: 100,
            ngram_max: 2,
        }
    }
}

/// A fitted TF-IDF vector space over the product catalog.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    terms: Vec<String>,
    idf: Vec<f64>,
    rows: Vec<Vec<(usize, f64)>>,
    product_ids: Vec<ProductId>,
    index_of: AHashMap<ProductId, usize>,
}

impl VectorSpace {
    /// Fit a vector space over the given products.
    ///
    /// Returns `None` for an empty catalog. Vocabulary is capped at
    /// `config.max_terms`, selected by corpus frequency with ties broken by
    /// term order, so refitting an unchanged catalog reproduces the same
    /// space.
    pub fn fit(products: &[Product], config: &VectorizerConfig) -> Option<VectorSpace> {
        if products.is_empty() {
            return None;
        }

        let docs: Vec<(ProductId, Vec<String>)> = products
            .iter()
            .map(|p| (p.id, analyzer::analyze(&feature_text(p), config.ngram_max)))
            .collect();

        // Corpus frequency and document frequency per term.
        let mut stats: AHashMap<&str, (usize, usize)> = AHashMap::new();
        for (_, terms) in &docs {
            let mut seen: AHashMap<&str, usize> = AHashMap::new();
            for term in terms {
                *seen.entry(term.as_str()).or_insert(0) += 1;
            }
            for (term, count) in seen {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += count;
                entry.1 += 1;
            }
        }

        // Select the vocabulary: most frequent first, ties alphabetical,
        // then index terms alphabetically for a stable layout.
        let mut candidates: Vec<(&str, usize, usize)> = stats
            .into_iter()
            .map(|(term, (count, df))| (term, count, df))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(config.max_terms);
        candidates.sort_by(|a, b| a.0.cmp(b.0));

        let terms: Vec<String> = candidates.iter().map(|(t, _, _)| t.to_string()).collect();
        let term_index: AHashMap<&str, usize> = candidates
            .iter()
            .enumerate()
            .map(|(i, (t, _, _))| (*t, i))
            .collect();

        let doc_count = docs.len() as f64;
        let idf: Vec<f64> = candidates
            .iter()
            .map(|(_, _, df)| ((1.0 + doc_count) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        let mut rows = Vec::with_capacity(docs.len());
        let mut product_ids = Vec::with_capacity(docs.len());
        let mut index_of = AHashMap::with_capacity(docs.len());

        for (product_id, doc_terms) in &docs {
            let mut tf: AHashMap<usize, f64> = AHashMap::new();
            for term in doc_terms {
                if let Some(&idx) = term_index.get(term.as_str()) {
                    *tf.entry(idx).or_insert(0.0) += 1.0;
                }
            }

            let mut row: Vec<(usize, f64)> = tf
                .into_iter()
                .map(|(idx, count)| (idx, count * idf[idx]))
                .collect();
            row.sort_by_key(|&(idx, _)| idx);

            let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in &mut row {
                    *w /= norm;
                }
            }

            index_of.insert(*product_id, rows.len());
            rows.push(row);
            product_ids.push(*product_id);
        }

        Some(VectorSpace {
            terms,
            idf,
            rows,
            product_ids,
            index_of,
        })
    }

    /// Number of products in the space.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the space holds no products.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The fitted vocabulary, alphabetically ordered.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight per vocabulary term.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Product ids in row order.
    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    /// Row index of a product, if the product was part of the fit.
    pub fn position(&self, product: ProductId) -> Option<usize> {
        self.index_of.get(&product).copied()
    }

    /// Sparse row at the given index.
    pub fn row(&self, index: usize) -> &[(usize, f64)] {
        &self.rows[index]
    }

    /// Cosine similarity between two rows.
    ///
    /// Rows are L2-normalized at fit time, so this is a sparse dot product;
    /// a zero vector yields 0.0 by convention.
    pub fn similarity(&self, a: usize, b: usize) -> f64 {
        let (row_a, row_b) = (&self.rows[a], &self.rows[b]);
        let mut dot = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < row_a.len() && j < row_b.len() {
            match row_a[i].0.cmp(&row_b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += row_a[i].1 * row_b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot
    }

    /// Cosine similarity between one row and every row in the space.
    pub fn similarities_to(&self, index: usize) -> Vec<f64> {
        (0..self.rows.len())
            .map(|other| self.similarity(index, other))
            .collect()
    }
}
