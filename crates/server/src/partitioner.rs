//! Splits a user-item matrix into user-complete shards.

use crate::error::{ClusterError, Result};
use data_loader::{Partition, UserItemMatrix};

/// Split `matrix` into `n` disjoint partitions.
///
/// Reviewers are dealt round-robin in sorted id order, so the `k`-th reviewer
/// lands in partition `k % n` and the assignment is reproducible. A reviewer's
/// row is never split. Partitions are empty when there are fewer reviewers
/// than slots.
pub fn partition(matrix: UserItemMatrix, n: usize) -> Result<Vec<Partition>> {
    if n == 0 {
        return Err(ClusterError::InvalidArgument(
            "partition count must be positive".to_string(),
        ));
    }

    let mut partitions = vec![Partition::new(); n];
    // UserItemMatrix is a BTreeMap, so this walks reviewers in sorted order
    for (k, (reviewer, items)) in matrix.into_iter().enumerate() {
        partitions[k % n].insert(reviewer, items);
    }
    Ok(partitions)
}
