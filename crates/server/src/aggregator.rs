//! Merges per-worker scores into the final ranked list.

use data_loader::{AggregatedResult, CategoryLookup, UNKNOWN_CATEGORY};

use crate::dispatcher::ScoreAccumulator;

/// Average each product's contributed scores, attach its category, rank by
/// score (descending, ties by product id ascending) and keep at most
/// `max_results` entries.
///
/// Products absent from `categories` get [`UNKNOWN_CATEGORY`]. Products with
/// an empty score list are skipped.
pub fn aggregate(
    scores: ScoreAccumulator,
    categories: &CategoryLookup,
    max_results: usize,
) -> Vec<AggregatedResult> {
    let mut results: Vec<AggregatedResult> = scores
        .into_iter()
        .filter(|(_, contributed)| !contributed.is_empty())
        .map(|(product_id, contributed)| {
            let stars = contributed.iter().sum::<f64>() / contributed.len() as f64;
            let category = categories
                .get(&product_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
            AggregatedResult {
                product_id,
                stars,
                category,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.stars
            .total_cmp(&a.stars)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    results.truncate(max_results);
    results
}
