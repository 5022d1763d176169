//! Serialized dataset documents for the CLI and test fixtures.
//!
//! A [`Dataset`] is the JSON shape the `verbena` binary loads into a
//! [`MemoryCatalog`](crate::catalog::memory::MemoryCatalog): one document
//! carrying the product catalog plus the like/order/review/follow event
//! streams.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::catalog::{Follow, Like, Order, OrderLine, Product, Review, UserId};
use crate::error::{Result, VerbenaError};

/// A complete catalog snapshot in serialized form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Product catalog.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Users with no recorded activity (active users are inferred).
    #[serde(default)]
    pub users: Vec<UserId>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub order_lines: Vec<OrderLine>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub follows: Vec<Follow>,
}

impl Dataset {
    /// Read a dataset from any JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let dataset: Dataset = serde_json::from_reader(reader)?;
        Ok(dataset)
    }

    /// Read a dataset from a JSON file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Check referential consistency of the document.
    ///
    /// Rejects review ratings outside 1-5, follow self-loops, and order
    /// lines whose order id does not appear in `orders`.
    pub fn validate(&self) -> Result<()> {
        for review in &self.reviews {
            if !(1..=5).contains(&review.rating) {
                return Err(VerbenaError::dataset(format!(
                    "review rating {} for product {} is outside 1-5",
                    review.rating, review.product_id
                )));
            }
        }

        for follow in &self.follows {
            if follow.follower == follow.following {
                return Err(VerbenaError::dataset(format!(
                    "user {} follows themselves",
                    follow.follower
                )));
            }
        }

        let order_ids: AHashSet<_> = self.orders.iter().map(|o| o.id).collect();
        for line in &self.order_lines {
            if !order_ids.contains(&line.order_id) {
                return Err(VerbenaError::dataset(format!(
                    "order line for product {} references unknown order {}",
                    line.product_id, line.order_id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_parses() {
        let dataset = Dataset::from_reader("{}".as_bytes()).unwrap();
        assert!(dataset.products.is_empty());
        dataset.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_rating() {
        let json = r#"{
            "reviews": [
                {"user_id": 1, "product_id": 2, "rating": 6,
                 "created_at": "2024-05-01T00:00:00Z"}
            ]
        }"#;
        let dataset = Dataset::from_reader(json.as_bytes()).unwrap();
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_orphan_line() {
        let json = r#"{
            "order_lines": [
                {"order_id": 5, "product_id": 2, "quantity": 1}
            ]
        }"#;
        let dataset = Dataset::from_reader(json.as_bytes()).unwrap();
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_full_document_parses() {
        let json = r#"{
            "products": [
                {"id": 1, "title": "Serum", "price": 39.99, "category": "serum",
                 "ingredients": ["vitamin c"], "benefits": ["brightening"]}
            ],
            "likes": [
                {"user_id": 1, "product_id": 1, "created_at": "2024-05-01T00:00:00Z"}
            ],
            "orders": [
                {"id": 1, "user_id": 1, "status": "delivered",
                 "created_at": "2024-05-02T00:00:00Z"}
            ],
            "order_lines": [
                {"order_id": 1, "product_id": 1, "quantity": 2}
            ],
            "reviews": [
                {"user_id": 1, "product_id": 1, "rating": 5,
                 "created_at": "2024-05-03T00:00:00Z"}
            ],
            "follows": [
                {"follower": 1, "following": 2}
            ]
        }"#;
        let dataset = Dataset::from_reader(json.as_bytes()).unwrap();
        dataset.validate().unwrap();
        assert_eq!(dataset.orders[0].status, crate::catalog::OrderStatus::Delivered);
        assert_eq!(dataset.order_lines[0].quantity, 2);
    }
}
