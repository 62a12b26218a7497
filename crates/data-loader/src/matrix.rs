//! Matrix builder: folds rating records into a sparse user-item matrix.

use crate::types::{RatingRecord, UserItemMatrix};

/// Build the user → item → stars matrix.
///
/// A later rating for the same (user, item) pair overwrites the earlier one.
pub fn build_user_item_matrix(records: &[RatingRecord]) -> UserItemMatrix {
    let mut matrix = UserItemMatrix::new();
    for record in records {
        matrix
            .entry(record.reviewer_id.clone())
            .or_default()
            .insert(record.product_id.clone(), record.stars);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, product: &str, stars: f64) -> RatingRecord {
        RatingRecord {
            reviewer_id: user.to_string(),
            product_id: product.to_string(),
            stars,
            category: "books".to_string(),
        }
    }

    #[test]
    fn test_rows_grouped_by_reviewer() {
        let matrix = build_user_item_matrix(&[
            record("u1", "p1", 5.0),
            record("u2", "p1", 4.0),
            record("u1", "p2", 3.0),
        ]);

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix["u1"].len(), 2);
        assert_eq!(matrix["u1"]["p2"], 3.0);
        assert_eq!(matrix["u2"]["p1"], 4.0);
    }

    #[test]
    fn test_duplicate_rating_last_write_wins() {
        let matrix = build_user_item_matrix(&[record("u1", "p1", 5.0), record("u1", "p1", 1.0)]);
        assert_eq!(matrix["u1"].len(), 1);
        assert_eq!(matrix["u1"]["p1"], 1.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_user_item_matrix(&[]).is_empty());
    }
}
