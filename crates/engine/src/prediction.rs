//! Prediction step
//!
//! For every reviewer, every product `i` they rated and every product `j`
//! related to `i`, the prediction for `j` is `scaled[i][j] * rating[i]`.
//!
//! Predictions are not accumulated: when several (reviewer, i) pairs reach the
//! same `j`, the one computed last replaces the others. Reviewers and their
//! products are visited in key order, so "last" is well defined.

use crate::similarity::SimilarityMatrix;
use data_loader::{Partition, PredictedResult, ProductId};
use std::collections::BTreeMap;

pub fn predict(scaled: &SimilarityMatrix, partition: &Partition) -> Vec<PredictedResult> {
    let mut predicted: BTreeMap<&ProductId, f64> = BTreeMap::new();

    for items in partition.values() {
        for (product_id, rating) in items {
            let Some(related) = scaled.get(product_id) else {
                continue;
            };
            for (similar_product, similarity) in related {
                predicted.insert(similar_product, similarity * rating);
            }
        }
    }

    predicted
        .into_iter()
        .map(|(product_id, stars)| PredictedResult::new(product_id.clone(), stars))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::UNKNOWN_CATEGORY;

    fn scaled(entries: &[(&str, &str, f64)]) -> SimilarityMatrix {
        let mut m = SimilarityMatrix::new();
        for (i, j, v) in entries {
            m.entry(i.to_string()).or_default().insert(j.to_string(), *v);
        }
        m
    }

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
    fn test_prediction_is_similarity_times_rating() {
        let sim = scaled(&[("p1", "p2", 1.0), ("p2", "p1", 1.0)]);
        let p = partition(&[("u1", &[("p1", 5.0), ("p2", 3.0)])]);

        let results = predict(&sim, &p);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], PredictedResult::new("p1", 3.0));
        assert_eq!(results[1], PredictedResult::new("p2", 5.0));
        assert!(results.iter().all(|r| r.category == UNKNOWN_CATEGORY));
    }

    #[test]
    fn test_last_write_wins_for_shared_target() {
        // Both u1 (via p1) and u2 (via p1) predict p2; u2 is visited last.
        let sim = scaled(&[("p1", "p2", 0.5)]);
        let p = partition(&[("u1", &[("p1", 4.0)]), ("u2", &[("p1", 2.0)])]);

        let results = predict(&sim, &p);

        assert_eq!(results, vec![PredictedResult::new("p2", 1.0)]);
    }

    #[test]
    fn test_later_source_item_overwrites_within_row() {
        // In u1's row p1 is visited before p3; both point at p2.
        let sim = scaled(&[("p1", "p2", 1.0), ("p3", "p2", 0.25)]);
        let p = partition(&[("u1", &[("p1", 4.0), ("p3", 4.0)])]);

        let results = predict(&sim, &p);

        assert_eq!(results, vec![PredictedResult::new("p2", 1.0)]);
    }

    #[test]
    fn test_items_without_relations_are_skipped() {
        let sim = SimilarityMatrix::new();
        let p = partition(&[("u1", &[("p1", 4.0)])]);
        assert!(predict(&sim, &p).is_empty());
    }
}
