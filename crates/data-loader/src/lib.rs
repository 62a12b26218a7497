//! # Data Loader Crate
//!
//! This crate handles loading and indexing the product ratings dataset and
//! turning it into the user-item matrix the cluster works on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RatingRecord, UserItemMatrix, PredictedResult, ...)
//! - **parser**: Parse the ratings CSV into Rust structs
//! - **index**: DataIndex with the category lookup and category filtering
//! - **matrix**: Fold filtered records into a UserItemMatrix
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_file(Path::new("data/ratings.csv"))?;
//! let matrix = index.build_matrix(&["books".to_string()]);
//!
//! println!("{} reviewers rated books", matrix.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod matrix;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use matrix::build_user_item_matrix;
pub use types::{
    // Type aliases
    ReviewerId,
    ProductId,
    UserItemMatrix,
    Partition,
    CategoryLookup,
    // Core types
    RatingRecord,
    PredictedResult,
    AggregatedResult,
    DataIndex,
    UNKNOWN_CATEGORY,
};
