//! # Verbena
//!
//! A hybrid product recommendation engine for Rust.
//!
//! ## Features
//!
//! - Content-based filtering (TF-IDF over product feature text)
//! - User-based and item-based collaborative filtering
//! - Social-graph propagation of friends' activity
//! - Trending-signal aggregation and cold-start fallbacks
//! - Weighted hybrid score fusion with source attribution
//! - TTL result caching with enumerated-limit invalidation
//!
//! The engine consumes a read-only [`catalog::CatalogStore`] and a
//! [`cache::KeyValueCache`] collaborator; [`engine::Recommender`] is the
//! facade callers talk to.

pub mod batch;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod collaborative;
pub mod content;
pub mod engine;
pub mod error;
pub mod feature;
pub mod hybrid;
pub mod interaction;
pub mod social;
pub mod stats;
pub mod trending;
pub mod types;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
