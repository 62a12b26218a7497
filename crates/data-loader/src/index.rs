//! DataIndex building and querying logic.
//!
//! This module builds the DataIndex from parsed rows:
//! - Keep every record in file order
//! - Build the dataset-wide product → category lookup
//! - Select the records of a set of categories
//!
//! Rust concepts you'll learn:
//! - Using Rayon for parallel filtering
//! - Entry-free HashMap inserts with overwrite semantics
//! - Borrowing: queries return references into the index

use crate::error::Result;
use crate::matrix::build_user_item_matrix;
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ratings CSV at `path` and index it
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading ratings dataset from {:?}", path);

        let records = parser::parse_ratings(path)?;
        let index = Self::from_records(records);

        let (records, products) = index.counts();
        info!("Loaded {} ratings covering {} products", records, products);
        Ok(index)
    }

    /// Build an index from already-parsed records
    pub fn from_records(records: Vec<RatingRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert_record(record);
        }
        index
    }

    /// Insert a record and update the category lookup
    pub fn insert_record(&mut self, record: RatingRecord) {
        self.categories
            .insert(record.product_id.clone(), record.category.clone());
        self.records.push(record);
    }

    /// The product → category lookup built from the full dataset
    pub fn categories(&self) -> &CategoryLookup {
        &self.categories
    }

    /// Category of a single product, if it was ever rated
    pub fn category_of(&self, product_id: &str) -> Option<&str> {
        self.categories.get(product_id).map(String::as_str)
    }

    /// Distinct categories, sorted
    pub fn known_categories(&self) -> Vec<String> {
        self.categories
            .values()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records whose category is one of `categories`, file order preserved.
    ///
    /// An empty selection selects nothing.
    pub fn filter_by_categories(&self, categories: &[String]) -> Vec<RatingRecord> {
        let selected: HashSet<&str> = categories.iter().map(String::as_str).collect();
        self.records
            .par_iter()
            .filter(|record| selected.contains(record.category.as_str()))
            .cloned()
            .collect()
    }

    /// Filter by categories and fold the result into a user-item matrix
    pub fn build_matrix(&self, categories: &[String]) -> UserItemMatrix {
        let filtered = self.filter_by_categories(categories);
        build_user_item_matrix(&filtered)
    }

    /// (records, distinct products) for debugging/validation
    pub fn counts(&self) -> (usize, usize) {
        (self.records.len(), self.categories.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, product: &str, stars: f64, category: &str) -> RatingRecord {
        RatingRecord {
            reviewer_id: user.to_string(),
            product_id: product.to_string(),
            stars,
            category: category.to_string(),
        }
    }

    fn sample_index() -> DataIndex {
        DataIndex::from_records(vec![
            record("u1", "p1", 5.0, "books"),
            record("u1", "p2", 3.0, "electronics"),
            record("u2", "p3", 4.0, "toys"),
            record("u3", "p1", 2.0, "books"),
        ])
    }

    #[test]
    fn test_filter_keeps_selected_categories_in_order() {
        let index = sample_index();
        let filtered =
            index.filter_by_categories(&["books".to_string(), "toys".to_string()]);

        let products: Vec<_> = filtered.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(products, vec!["p1", "p3", "p1"]);
    }

    #[test]
    fn test_empty_selection_selects_nothing() {
        let index = sample_index();
        assert!(index.filter_by_categories(&[]).is_empty());
        assert!(index.build_matrix(&[]).is_empty());
    }

    #[test]
    fn test_category_lookup_uses_full_dataset() {
        let index = sample_index();
        // Built before any filtering, so every product resolves
        assert_eq!(index.category_of("p2"), Some("electronics"));
        assert_eq!(index.category_of("p3"), Some("toys"));
        assert_eq!(index.category_of("missing"), None);
    }

    #[test]
    fn test_later_record_overwrites_category() {
        let mut index = sample_index();
        index.insert_record(record("u4", "p1", 1.0, "comics"));
        assert_eq!(index.category_of("p1"), Some("comics"));
    }

    #[test]
    fn test_known_categories_sorted() {
        let index = sample_index();
        assert_eq!(
            index.known_categories(),
            vec!["books".to_string(), "electronics".to_string(), "toys".to_string()]
        );
    }

    #[test]
    fn test_build_matrix() {
        let index = sample_index();
        let matrix = index.build_matrix(&["books".to_string()]);
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix["u1"]["p1"], 5.0);
        assert_eq!(matrix["u3"]["p1"], 2.0);
        assert!(!matrix["u1"].contains_key("p2"));
    }
}
