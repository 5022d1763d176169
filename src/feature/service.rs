//! Process-wide owner of the fitted feature vector space.
//!
//! The space is expensive to fit and read-mostly, so one service instance is
//! shared through the call chain (never a module-level singleton) and guards
//! the fitted state with a read-write lock. `get_or_build` fits lazily on
//! first access; `rebuild` is the explicit refresh hook for admin actions and
//! scheduled jobs. Concurrent rebuilds race benignly: the last writer wins.

use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::catalog::CatalogStore;
use crate::error::Result;
use crate::feature::vectorizer::{VectorSpace, VectorizerConfig};

/// Lazily built, explicitly rebuilt holder of the [`VectorSpace`].
pub struct FeatureVectorService {
    store: Arc<dyn CatalogStore>,
    config: VectorizerConfig,
    space: RwLock<Option<Arc<VectorSpace>>>,
}

impl FeatureVectorService {
    /// Create a service with the default vectorizer configuration.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self::with_config(store, VectorizerConfig::default())
    }

    /// Create a service with a custom vectorizer configuration.
    pub fn with_config(store: Arc<dyn CatalogStore>, config: VectorizerConfig) -> Self {
        Self {
            store,
            config,
            space: RwLock::new(None),
        }
    }

    /// The cached space, fitting it on first access.
    ///
    /// Returns `None` while the catalog is empty. Catalog writes after the
    /// fit are not reflected until [`rebuild`](Self::rebuild) runs.
    pub fn get_or_build(&self) -> Result<Option<Arc<VectorSpace>>> {
        if let Some(space) = self.space.read().clone() {
            return Ok(Some(space));
        }
        self.rebuild()
    }

    /// Refit the space from the current catalog and replace the cached one.
    pub fn rebuild(&self) -> Result<Option<Arc<VectorSpace>>> {
        let products = self.store.products()?;
        let fitted = VectorSpace::fit(&products, &self.config).map(Arc::new);

        match &fitted {
            Some(space) => debug!(
                "fitted feature vector space: {} products, {} terms",
                space.len(),
                space.terms().len()
            ),
            None => debug!("catalog is empty, no feature vector space fitted"),
        }

        *self.space.write() = fitted.clone();
        Ok(fitted)
    }
}
