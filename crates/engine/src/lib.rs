//! # Engine Crate
//!
//! The scoring pipeline each worker runs on the partition it receives.
//!
//! ## Stages
//!
//! 1. **Co-occurrence** (`similarity`): unnormalized rating dot products for
//!    every pair of products rated by the same reviewer
//! 2. **Scaling** (`scaling`): min-max rescale of all scores into [0, 1]
//! 3. **Prediction** (`prediction`): scaled score times the reviewer's rating
//!    of the source product, last write wins per target product
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::WorkerEngine;
//!
//! let engine = WorkerEngine::new();
//! let predictions = engine.run(&partition);
//! ```
//!
//! The engine is a pure function of its input and keeps no state between runs.

pub mod error;
pub mod similarity;
pub mod scaling;
pub mod prediction;

pub use error::{EngineError, Result};
pub use scaling::DEGENERATE_SCALE_FALLBACK;
pub use similarity::SimilarityMatrix;

use data_loader::{Partition, PredictedResult};
use tracing::{debug, instrument};

/// Runs the co-occurrence → scaling → prediction pipeline
#[derive(Debug, Clone, Copy)]
pub struct WorkerEngine {
    /// Scaled value used when every similarity entry is identical
    degenerate_fallback: f64,
}

impl WorkerEngine {
    pub fn new() -> Self {
        Self {
            degenerate_fallback: DEGENERATE_SCALE_FALLBACK,
        }
    }

    /// Configure the single-valued scaling fallback (default: 1.0)
    pub fn with_degenerate_fallback(mut self, fallback: f64) -> Self {
        self.degenerate_fallback = fallback;
        self
    }

    /// Score one partition
    #[instrument(skip(self, partition), fields(reviewers = partition.len()))]
    pub fn run(&self, partition: &Partition) -> Vec<PredictedResult> {
        let similarities = similarity::co_occurrence(partition);
        debug!(
            "Computed {} co-occurrence entries",
            similarity::entry_count(&similarities)
        );

        let scaled = scaling::min_max_scale_or(&similarities, self.degenerate_fallback);

        let results = prediction::predict(&scaled, partition);
        debug!("Predicted scores for {} products", results.len());
        results
    }
}

impl Default for WorkerEngine {
    fn default() -> Self {
        Self::new()
    }
}
