//! # Recommendation Orchestrator
//!
//! This module coordinates one request cycle on the master:
//! 1. Filter ratings by the requested categories
//! 2. Build the user-item matrix
//! 3. Partition it, one shard per configured worker
//! 4. Probe which workers are reachable
//! 5. Dispatch shards and merge the workers' predictions
//! 6. Average, annotate, rank and truncate
//!
//! A cycle succeeds as soon as partitioning succeeds, even if every worker
//! fails; the report's counters show how much of the matrix was covered.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use data_loader::{AggregatedResult, DataIndex, Partition};
use protocol::RecommendationRequest;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aggregator;
use crate::config::ClusterConfig;
use crate::dispatcher::{self, Dispatcher};
use crate::partitioner;
use crate::prober::AvailabilityProber;

/// Ranked results plus how much of the work actually completed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub results: Vec<AggregatedResult>,
    pub partitions_total: usize,
    pub partitions_dispatched: usize,
    pub partitions_succeeded: usize,
    pub workers_configured: usize,
    pub workers_available: usize,
}

impl RecommendationReport {
    /// True when every partition was processed by a worker
    pub fn is_complete(&self) -> bool {
        self.partitions_succeeded == self.partitions_total
    }
}

/// Main orchestrator that coordinates the distributed pipeline
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    data_index: Arc<DataIndex>,
    workers: Arc<Vec<String>>,
    prober: AvailabilityProber,
    dispatcher: Dispatcher,
}

impl RecommendationOrchestrator {
    pub fn new(data_index: Arc<DataIndex>, config: &ClusterConfig) -> Self {
        Self {
            data_index,
            workers: Arc::new(config.workers.clone()),
            prober: AvailabilityProber::new(config.probe_timeout),
            dispatcher: Dispatcher::new(config.dispatch.clone()),
        }
    }

    /// Configured worker addresses, in slot order
    pub fn workers(&self) -> &[String] {
        &self.workers
    }

    /// Run one full request cycle
    #[instrument(skip(self, request), fields(categories = request.categories.len(), max_results = request.max_results))]
    pub async fn get_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationReport> {
        let start_time = Instant::now();

        let partitions = self.build_partitions(request).await?;
        let partitions_total = partitions.len();

        let available = self.prober.probe(&self.workers).await;
        if available.len() < self.workers.len() {
            warn!(
                "Only {}/{} workers available, their partitions will be skipped",
                available.len(),
                self.workers.len()
            );
        }

        let assignments = dispatcher::plan_assignments(&self.workers, &available, partitions);
        let outcome = self.dispatcher.dispatch(assignments).await;

        let results = aggregator::aggregate(
            outcome.scores,
            self.data_index.categories(),
            request.max_results,
        );

        let report = RecommendationReport {
            results,
            partitions_total,
            partitions_dispatched: outcome.dispatched,
            partitions_succeeded: outcome.succeeded,
            workers_configured: self.workers.len(),
            workers_available: available.len(),
        };

        info!(
            "Request cycle finished in {:.2?}: {} results, {}/{} partitions succeeded",
            start_time.elapsed(),
            report.results.len(),
            report.partitions_succeeded,
            report.partitions_total
        );
        Ok(report)
    }

    /// Filter, build the matrix and partition it on the blocking pool
    async fn build_partitions(&self, request: &RecommendationRequest) -> Result<Vec<Partition>> {
        let data_index = Arc::clone(&self.data_index);
        let categories = request.categories.clone();
        let slots = self.workers.len();

        let partitions = tokio::task::spawn_blocking(move || {
            let matrix = data_index.build_matrix(&categories);
            info!("Built user-item matrix with {} reviewers", matrix.len());
            partitioner::partition(matrix, slots)
        })
        .await
        .context("Matrix building task panicked")?
        .context("Failed to partition the user-item matrix")?;

        Ok(partitions)
    }
}
