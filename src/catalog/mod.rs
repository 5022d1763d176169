//! Catalog data model and the read-only store collaborator.
//!
//! The recommendation engine never owns the product catalog or the event
//! streams; it consumes them through the [`CatalogStore`] trait. A database
//! backend implements the trait against its own tables, while
//! [`memory::MemoryCatalog`] provides an in-process implementation for tests,
//! the CLI, and embedders without a database.

pub mod dataset;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifier of an application user.
pub type UserId = u64;

/// Identifier of a catalog product.
pub type ProductId = u64;

/// Identifier of an order.
pub type OrderId = u64;

/// A product in the catalog.
///
/// The textual attributes (category, ingredients, benefits) feed the
/// content-based feature vectors; the price determines the price-tier token.
/// The average rating is derived from reviews, not stored on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Price in the store currency.
    pub price: f64,
    /// Category label (e.g. "serum", "cleanser").
    pub category: String,
    /// Ordered ingredient list.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Ordered benefit list.
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this status counts as a purchase.
    ///
    /// Only confirmed, processing, shipped, and delivered orders contribute
    /// purchase interactions; pending and cancelled orders are ignored.
    pub fn is_purchase(&self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed
                | OrderStatus::Processing
                | OrderStatus::Shipped
                | OrderStatus::Delivered
        )
    }
}

/// An order placed by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// The ordering user.
    pub user_id: UserId,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A single product line within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The order this line belongs to.
    pub order_id: OrderId,
    /// The purchased product.
    pub product_id: ProductId,
    /// Units purchased on this line.
    pub quantity: u32,
}

/// A user's like of a product.
///
/// Uniqueness of a (user, product) like is enforced by the caller's storage;
/// the engine counts whatever records the store hands it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// A product review with a 1-5 star rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Star rating, 1-5.
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

/// A directed follower -> following edge in the social graph.
///
/// Edges are asymmetric and never self-referential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub follower: UserId,
    pub following: UserId,
}

/// Read-only access to the catalog and event streams.
///
/// Every accessor returns `Result` so an implementation backed by a real
/// database can surface query failures; the engine propagates them with `?`.
/// Missing subjects are not errors: lookups for unknown users or products
/// return empty collections or `None`.
pub trait CatalogStore: Send + Sync {
    /// All products in the catalog.
    fn products(&self) -> Result<Vec<Product>>;

    /// Resolve a single product, `None` if it no longer exists.
    fn product(&self, id: ProductId) -> Result<Option<Product>>;

    /// All known user identifiers.
    fn user_ids(&self) -> Result<Vec<UserId>>;

    /// All like events.
    fn likes(&self) -> Result<Vec<Like>>;

    /// Like events recorded for one user.
    fn likes_by_user(&self, user: UserId) -> Result<Vec<Like>>;

    /// All orders, regardless of status.
    fn orders(&self) -> Result<Vec<Order>>;

    /// Orders placed by one user.
    fn orders_by_user(&self, user: UserId) -> Result<Vec<Order>>;

    /// Lines of a single order.
    fn order_lines(&self, order: OrderId) -> Result<Vec<OrderLine>>;

    /// All reviews.
    fn reviews(&self) -> Result<Vec<Review>>;

    /// Reviews written by one user.
    fn reviews_by_user(&self, user: UserId) -> Result<Vec<Review>>;

    /// All follow edges.
    fn follows(&self) -> Result<Vec<Follow>>;

    /// Users that the given user follows (the "friend set").
    fn following(&self, user: UserId) -> Result<Vec<UserId>>;
}
