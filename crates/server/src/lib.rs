//! Cluster crate for the distributed recommendation engine.
//!
//! The master side partitions the user-item matrix, probes and dispatches to
//! workers, then aggregates their predictions. The worker side scores one
//! partition per connection.

pub mod aggregator;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod feed;
pub mod master;
pub mod orchestrator;
pub mod partitioner;
pub mod prober;
pub mod worker;

pub use aggregator::aggregate;
pub use config::ClusterConfig;
pub use dispatcher::{
    Assignment, DispatchOutcome, DispatchPolicy, Dispatcher, ScoreAccumulator, plan_assignments,
};
pub use error::{ClusterError, Result};
pub use feed::{RecommendationFeed, Snapshot};
pub use master::MasterServer;
pub use orchestrator::{RecommendationOrchestrator, RecommendationReport};
pub use partitioner::partition;
pub use prober::{AvailabilityProber, DEFAULT_PROBE_TIMEOUT};
pub use worker::WorkerServer;
