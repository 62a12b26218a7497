//! Co-occurrence scoring
//!
//! For every reviewer row and every ordered pair (i, j) of distinct products
//! in that row, accumulate `rating[i] * rating[j]` into `similarity[i][j]`.
//!
//! The score is an unnormalized dot product over co-raters, not a cosine
//! similarity: nothing divides by the rating vectors' magnitudes.

use data_loader::{Partition, ProductId};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// product → co-occurring product → accumulated score
pub type SimilarityMatrix = BTreeMap<ProductId, BTreeMap<ProductId, f64>>;

/// Accumulate co-occurrence scores over every row of the partition.
///
/// Source products are scored in parallel. Each `(i, j)` sum is added up in
/// reviewer id order, so the floating-point result is identical across runs
/// and thread counts.
pub fn co_occurrence(partition: &Partition) -> SimilarityMatrix {
    // source product → rows containing it, in reviewer order
    let mut rows_by_source: BTreeMap<&ProductId, Vec<&BTreeMap<ProductId, f64>>> =
        BTreeMap::new();
    for items in partition.values().filter(|items| items.len() >= 2) {
        for product in items.keys() {
            rows_by_source.entry(product).or_default().push(items);
        }
    }

    let similarities: SimilarityMatrix = rows_by_source
        .into_par_iter()
        .map(|(source, rows)| (source.clone(), score_source(source, &rows)))
        .collect();

    debug!(
        "Computed co-occurrence for {} products from {} reviewers",
        similarities.len(),
        partition.len()
    );
    similarities
}

fn score_source(
    source: &ProductId,
    rows: &[&BTreeMap<ProductId, f64>],
) -> BTreeMap<ProductId, f64> {
    let mut related = BTreeMap::new();
    for items in rows {
        let rating_i = items[source];
        for (j, rating_j) in items.iter() {
            if j == source {
                continue;
            }
            *related.entry(j.clone()).or_insert(0.0) += rating_i * rating_j;
        }
    }
    related
}

/// Number of (i, j) entries in the matrix
pub fn entry_count(similarities: &SimilarityMatrix) -> usize {
    similarities.values().map(BTreeMap::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(rows: &[(&str, &[(&str, f64)])]) -> Partition {
        rows.iter()
            .map(|(user, items)| {
                (
                    user.to_string(),
                    items.iter().map(|(p, r)| (p.to_string(), *r)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_dot_product_across_reviewers() {
        let p = partition(&[
            ("u1", &[("p1", 5.0), ("p2", 3.0)]),
            ("u2", &[("p1", 4.0), ("p2", 2.0)]),
        ]);

        let sim = co_occurrence(&p);

        // 5*3 + 4*2
        assert_eq!(sim["p1"]["p2"], 23.0);
        assert_eq!(sim["p2"]["p1"], 23.0);
    }

    #[test]
    fn test_no_self_pairs() {
        let p = partition(&[("u1", &[("p1", 5.0), ("p2", 3.0), ("p3", 1.0)])]);
        let sim = co_occurrence(&p);

        for (i, related) in &sim {
            assert!(!related.contains_key(i), "{i} should not relate to itself");
        }
        assert_eq!(entry_count(&sim), 6);
        assert_eq!(sim["p3"]["p1"], 5.0);
    }

    #[test]
    fn test_single_item_rows_produce_nothing() {
        let p = partition(&[("u1", &[("p1", 5.0)]), ("u2", &[("p2", 4.0)])]);
        assert!(co_occurrence(&p).is_empty());
    }

    #[test]
    fn test_only_pairs_within_same_row() {
        let p = partition(&[
            ("u1", &[("p1", 2.0), ("p2", 2.0)]),
            ("u2", &[("p3", 3.0), ("p4", 1.0)]),
        ]);
        let sim = co_occurrence(&p);

        assert!(!sim["p1"].contains_key("p3"));
        assert_eq!(sim["p3"]["p4"], 3.0);
        assert_eq!(entry_count(&sim), 4);
    }

    #[test]
    fn test_fractional_sums_follow_reviewer_order() {
        let rows: Vec<(String, BTreeMap<ProductId, f64>)> = (0..500)
            .map(|k| {
                let items = [
                    ("a".to_string(), 0.1 * (k % 7) as f64 + 0.3),
                    ("b".to_string(), 1.0 / (k + 3) as f64),
                    ("c".to_string(), 0.7 + 0.01 * k as f64),
                ]
                .into_iter()
                .collect();
                (format!("u{k:04}"), items)
            })
            .collect();
        let p: Partition = rows.into_iter().collect();

        // Sequential sum in sorted reviewer order
        let mut expected = 0.0;
        for items in p.values() {
            expected += items["a"] * items["b"];
        }

        for _ in 0..5 {
            let sim = co_occurrence(&p);
            assert_eq!(sim["a"]["b"].to_bits(), expected.to_bits());
            assert_eq!(sim["b"]["a"], sim["a"]["b"]);
        }
    }
}
