//! Core domain types for the product ratings dataset.
//!
//! This module defines the fundamental data structures shared by the master,
//! the workers and the wire protocol.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (ReviewerId, ProductId)
//! - Structs with public fields
//! - Derive macros for common traits
//! - BTreeMap for deterministic, key-ordered traversal

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up reviewer IDs with product IDs

/// Identifier of the reviewer who left a rating
pub type ReviewerId = String;

/// Identifier of a rated product
pub type ProductId = String;

/// Sparse user → item → rating structure.
///
/// Ordered maps keep traversal order stable, which both partitioning and the
/// last-write-wins prediction step rely on.
pub type UserItemMatrix = BTreeMap<ReviewerId, BTreeMap<ProductId, f64>>;

/// A user-complete shard of a [`UserItemMatrix`] assigned to one worker.
pub type Partition = UserItemMatrix;

/// Dataset-wide product → category lookup
pub type CategoryLookup = HashMap<ProductId, String>;

/// Category used whenever a product's category cannot be resolved
pub const UNKNOWN_CATEGORY: &str = "unknown";

// =============================================================================
// Rating Type
// =============================================================================

/// A single row of the ratings dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub reviewer_id: ReviewerId,
    pub product_id: ProductId,
    pub stars: f64,
    #[serde(rename = "product_category")]
    pub category: String,
}

// =============================================================================
// Result Types
// =============================================================================

/// A worker's predicted score for one target product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedResult {
    pub product_id: ProductId,
    pub stars: f64,
    pub category: String,
}

impl PredictedResult {
    /// Prediction with the placeholder category; the master resolves the real one.
    pub fn new(product_id: impl Into<ProductId>, stars: f64) -> Self {
        Self {
            product_id: product_id.into(),
            stars,
            category: UNKNOWN_CATEGORY.to_string(),
        }
    }
}

/// One entry of the final ranked list: the mean of all worker predictions
/// for a product, annotated with its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub product_id: ProductId,
    pub stars: f64,
    pub category: String,
}

// =============================================================================
// DataIndex - The In-Memory Dataset
// =============================================================================

/// Holds every parsed rating plus the category lookup built from the full,
/// unfiltered dataset.
#[derive(Debug, Default)]
pub struct DataIndex {
    /// Records in file order
    pub(crate) records: Vec<RatingRecord>,
    /// product → category, later records overwrite earlier ones
    pub(crate) categories: CategoryLookup,
}
