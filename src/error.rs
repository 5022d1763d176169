//! Error types for the Verbena library.
//!
//! All fallible operations in the crate return [`Result`], whose error type is
//! the [`VerbenaError`] enum. Recommendation lookups themselves are best-effort
//! and report missing subjects with empty results rather than errors; the
//! variants here cover the collaborators (catalog store, cache, dataset files)
//! that can genuinely fail.
//!
//! # Examples
//!
//! ```
//! use verbena::error::{Result, VerbenaError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(VerbenaError::store("connection lost"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Verbena operations.
#[derive(Error, Debug)]
pub enum VerbenaError {
    /// I/O errors (dataset files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Catalog store errors (the backing data source failed).
    #[error("Store error: {0}")]
    Store(String),

    /// Cache-layer errors.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Dataset loading/validation errors.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Feature vectorization errors.
    #[error("Vectorizer error: {0}")]
    Vectorizer(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with VerbenaError.
pub type Result<T> = std::result::Result<T, VerbenaError>;

impl VerbenaError {
    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        VerbenaError::Store(msg.into())
    }

    /// Create a new cache error.
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        VerbenaError::Cache(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        VerbenaError::Dataset(msg.into())
    }

    /// Create a new vectorizer error.
    pub fn vectorizer<S: Into<String>>(msg: S) -> Self {
        VerbenaError::Vectorizer(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        VerbenaError::InvalidOperation(msg.into())
    }

    /// Create a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        VerbenaError::Other(msg.into())
    }
}
