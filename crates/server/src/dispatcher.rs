//! # Dispatcher
//!
//! Fans partitions out to the available workers and fans their predictions
//! back in:
//! 1. Pair partition `i` with configured worker `i`, skipping unavailable ones
//! 2. Spawn one task per pair: connect, send, read, decode
//! 3. Append each successful worker's predictions to a shared accumulator
//! 4. Join every task before returning
//!
//! Per-worker failures are logged and dropped. They never reach the caller;
//! the outcome's counters are the only trace of a partial batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use data_loader::{Partition, PredictedResult, ProductId};
use protocol::{ExchangeError, WorkerClient};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// product → every score contributed for it, one entry per worker result
pub type ScoreAccumulator = HashMap<ProductId, Vec<f64>>;

/// Deadline and retry settings for worker exchanges.
///
/// The defaults reproduce the plain behaviour: no deadline, a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPolicy {
    /// Deadline for one complete exchange (connect + write + read)
    pub exchange_timeout: Option<Duration>,
    /// Extra attempts after the first failure
    pub max_retries: u32,
    /// Pause between attempts
    pub retry_backoff: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            exchange_timeout: None,
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// One partition bound for one worker
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Index of the configured worker slot (and of the partition)
    pub slot: usize,
    pub worker: String,
    pub partition: Partition,
}

/// Pair partition `i` with configured worker `i` when that worker is available.
///
/// Partitions whose worker did not answer the probe are skipped; their users
/// contribute nothing to this request.
pub fn plan_assignments(
    configured: &[String],
    available: &[String],
    partitions: Vec<Partition>,
) -> Vec<Assignment> {
    let available: HashSet<&str> = available.iter().map(String::as_str).collect();

    configured
        .iter()
        .zip(partitions)
        .enumerate()
        .filter_map(|(slot, (worker, partition))| {
            if available.contains(worker.as_str()) {
                Some(Assignment {
                    slot,
                    worker: worker.clone(),
                    partition,
                })
            } else {
                warn!(
                    "Skipping partition {} ({} reviewers): worker {} unavailable",
                    slot,
                    partition.len(),
                    worker
                );
                None
            }
        })
        .collect()
}

/// Result of one dispatch round
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub scores: ScoreAccumulator,
    /// Partitions actually sent to a worker
    pub dispatched: usize,
    /// Partitions whose worker answered with a decodable response
    pub succeeded: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    policy: DispatchPolicy,
}

impl Dispatcher {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self { policy }
    }

    /// Run every assignment concurrently and wait for all of them.
    ///
    /// Without an `exchange_timeout`, a worker that never answers keeps this
    /// future pending.
    pub async fn dispatch(&self, assignments: Vec<Assignment>) -> DispatchOutcome {
        let accumulator: Arc<Mutex<ScoreAccumulator>> = Arc::new(Mutex::new(HashMap::new()));
        let dispatched = assignments.len();

        let mut handles = Vec::with_capacity(dispatched);
        for assignment in assignments {
            let accumulator = Arc::clone(&accumulator);
            let policy = self.policy.clone();
            let handle = tokio::spawn(async move {
                let Assignment {
                    slot,
                    worker,
                    partition,
                } = assignment;
                let client = WorkerClient::new(worker);

                match exchange_with_policy(&client, &partition, &policy).await {
                    Ok(results) => {
                        let count = results.len();
                        // Held only for the append, never across I/O
                        let mut scores = accumulator.lock().await;
                        for result in results {
                            scores.entry(result.product_id).or_default().push(result.stars);
                        }
                        drop(scores);
                        debug!("Partition {} merged {} results", slot, count);
                        true
                    }
                    Err(e) => {
                        error!(
                            "Partition {} failed on worker {}: {}",
                            slot,
                            client.address(),
                            e
                        );
                        false
                    }
                }
            });
            handles.push(handle);
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await {
                Ok(true) => succeeded += 1,
                Ok(false) => {}
                Err(e) => error!("Dispatch task panicked: {}", e),
            }
        }

        let scores = std::mem::take(&mut *accumulator.lock().await);
        info!(
            "Dispatch complete: {}/{} partitions succeeded, {} products scored",
            succeeded,
            dispatched,
            scores.len()
        );

        DispatchOutcome {
            scores,
            dispatched,
            succeeded,
        }
    }
}

/// One exchange under the policy's deadline, retried up to `max_retries` times
async fn exchange_with_policy(
    client: &WorkerClient,
    partition: &Partition,
    policy: &DispatchPolicy,
) -> Result<Vec<PredictedResult>, ExchangeError> {
    let mut attempt = 0;
    loop {
        let result = match policy.exchange_timeout {
            Some(deadline) => tokio::time::timeout(deadline, client.score_partition(partition))
                .await
                .unwrap_or(Err(ExchangeError::Timeout(deadline))),
            None => client.score_partition(partition).await,
        };

        match result {
            Ok(results) => return Ok(results),
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                warn!(
                    "Exchange with {} failed ({}), retry {}/{} in {:?}",
                    client.address(),
                    e,
                    attempt,
                    policy.max_retries,
                    policy.retry_backoff
                );
                tokio::time::sleep(policy.retry_backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
