//! Result caching for precomputed recommendations.
//!
//! The cache is an external collaborator with plain key-value semantics:
//! string keys, JSON payloads, per-entry TTLs. Keys are deterministic
//! functions of (operation, subject, limit), and only the limits enumerated
//! in [`CacheLimits`] are ever cached, so invalidation can purge a fixed set
//! of keys instead of scanning. Cache failures are never fatal; callers
//! treat them as misses and recompute.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{ProductId, UserId};
use crate::error::Result;

/// TTL for personalized recommendation payloads (1 hour).
pub const PERSONALIZED_TTL: Duration = Duration::from_secs(3600);

/// TTL for similar-product payloads (24 hours).
pub const SIMILAR_PRODUCTS_TTL: Duration = Duration::from_secs(86_400);

/// TTL for friends-trending payloads (30 minutes).
pub const FRIENDS_TRENDING_TTL: Duration = Duration::from_secs(1800);

/// TTL for cold-start payloads (24 hours).
pub const COLD_START_TTL: Duration = Duration::from_secs(86_400);

/// Key-value cache collaborator.
///
/// Implementations may fail (a remote cache losing its connection); the
/// engine logs such failures and falls through to recomputation, so no
/// method error ever reaches an API caller.
pub trait KeyValueCache: Send + Sync {
    /// Fetch a payload, `None` on miss or expiry.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store a payload with a TTL.
    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Remove one key, ignoring absence.
    fn delete(&self, key: &str) -> Result<()>;

    /// Drop every entry.
    fn clear(&self) -> Result<()>;
}

#[derive(Debug)]
struct CacheSlot {
    value: Value,
    expires_at: Instant,
}

/// In-process [`KeyValueCache`] with passive per-entry expiry.
///
/// Entries expire on read; nothing sweeps the map in the background. Good
/// enough for tests, the CLI, and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<AHashMap<String, CacheSlot>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|slot| slot.expires_at > now)
            .count()
    }

    /// Whether the cache holds no unexpired entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(slot) if slot.expires_at > Instant::now() => Ok(Some(slot.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        self.entries.lock().insert(
            key.to_string(),
            CacheSlot {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

/// Cache key for a user's personalized recommendations.
pub fn personalized_key(user: UserId, limit: usize) -> String {
    format!("recommendations_user_{user}_limit_{limit}")
}

/// Cache key for a product's similar-products list.
pub fn similar_products_key(product: ProductId, limit: usize) -> String {
    format!("similar_products_{product}_limit_{limit}")
}

/// Cache key for a user's friends-trending list.
pub fn friends_trending_key(user: UserId, limit: usize) -> String {
    format!("friends_trending_user_{user}_limit_{limit}")
}

/// Cache key for the shared cold-start list.
pub fn cold_start_key(limit: usize) -> String {
    format!("cold_start_recommendations_limit_{limit}")
}

/// The enumerated limit values eligible for caching, per operation.
///
/// A request with a limit outside its enumeration is computed fresh every
/// time and never stored, which keeps invalidation a bounded key purge.
/// Warming iterates the same enumerations, so a warmed key can never
/// survive its subject's invalidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheLimits {
    /// Cached limits for personalized recommendations.
    pub personalized: Vec<usize>,
    /// Cached limits for friends-trending.
    pub friends_trending: Vec<usize>,
    /// Cached limits for similar products.
    pub similar_products: Vec<usize>,
    /// Cached limits for cold start.
    pub cold_start: Vec<usize>,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            personalized: vec![10, 20, 30, 50],
            friends_trending: vec![15, 30],
            similar_products: vec![5, 10, 15, 20],
            cold_start: vec![10, 20, 30],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let cache = MemoryCache::new();
        cache
            .set("k", json!({"hello": "world"}), Duration::from_secs(60))
            .unwrap();

        assert_eq!(cache.get("k").unwrap(), Some(json!({"hello": "world"})));
        assert_eq!(cache.get("missing").unwrap(), None);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::ZERO).unwrap();

        assert_eq!(cache.get("k").unwrap(), None);
        // The expired slot is also reaped.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1), Duration::from_secs(60)).unwrap();
        cache.set("b", json!(2), Duration::from_secs(60)).unwrap();

        cache.delete("a").unwrap();
        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.len(), 1);

        cache.clear().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_formats() {
        assert_eq!(personalized_key(42, 20), "recommendations_user_42_limit_20");
        assert_eq!(similar_products_key(7, 5), "similar_products_7_limit_5");
        assert_eq!(
            friends_trending_key(42, 15),
            "friends_trending_user_42_limit_15"
        );
        assert_eq!(cold_start_key(10), "cold_start_recommendations_limit_10");
    }

    #[test]
    fn test_ttls_by_volatility() {
        assert_eq!(PERSONALIZED_TTL, Duration::from_secs(3600));
        assert_eq!(SIMILAR_PRODUCTS_TTL, Duration::from_secs(86_400));
        assert_eq!(FRIENDS_TRENDING_TTL, Duration::from_secs(1800));
        assert_eq!(COLD_START_TTL, Duration::from_secs(86_400));
    }

    #[test]
    fn test_default_limit_enumerations() {
        let limits = CacheLimits::default();
        assert_eq!(limits.personalized, vec![10, 20, 30, 50]);
        assert_eq!(limits.friends_trending, vec![15, 30]);
        assert_eq!(limits.similar_products, vec![5, 10, 15, 20]);
        assert_eq!(limits.cold_start, vec![10, 20, 30]);
    }
}
