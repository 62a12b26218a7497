//! Parser for the ratings CSV file.
//!
//! Expected layout (header row first, columns by position):
//! `reviewer_id,product_id,stars,category`
//!
//! Rust concepts you'll learn here:
//! - Error handling with `?` operator
//! - Converting between types (parsing strings to numbers)
//! - Wrapping a third-party reader (csv) behind our own error type

use crate::error::{DataLoadError, Result};
use crate::types::RatingRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

const EXPECTED_FIELDS: usize = 4;

/// Parse the ratings file at `path`
pub fn parse_ratings(path: &Path) -> Result<Vec<RatingRecord>> {
    let file_name = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: file_name.clone(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    parse_ratings_from_reader(file, &file_name)
}

/// Parse ratings from any reader; `file_name` is only used in error messages
pub fn parse_ratings_from_reader<R: Read>(reader: R, file_name: &str) -> Result<Vec<RatingRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut ratings = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|source| DataLoadError::CsvError {
            file: file_name.to_string(),
            source,
        })?;
        if is_blank(&row) {
            continue;
        }
        ratings.push(parse_row(&row, file_name)?);
    }
    Ok(ratings)
}

fn is_blank(row: &StringRecord) -> bool {
    row.iter().all(|field| field.is_empty())
}

fn parse_row(row: &StringRecord, file_name: &str) -> Result<RatingRecord> {
    let line = row.position().map(|p| p.line()).unwrap_or(0);

    if row.len() < EXPECTED_FIELDS {
        return Err(DataLoadError::FieldCountMismatch {
            expected: EXPECTED_FIELDS,
            found: row.len(),
            line,
        });
    }

    let stars = row[2].parse::<f64>().map_err(|e| DataLoadError::ParseError {
        file: file_name.to_string(),
        line,
        reason: format!("Invalid stars '{}': {}", &row[2], e),
    })?;
    // JSON has no encoding for NaN or infinity
    if !stars.is_finite() {
        return Err(DataLoadError::ParseError {
            file: file_name.to_string(),
            line,
            reason: format!("Non-finite stars '{}'", &row[2]),
        });
    }

    Ok(RatingRecord {
        reviewer_id: row[0].to_string(),
        product_id: row[1].to_string(),
        stars,
        category: row[3].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
reviewer_id,product_id,stars,product_category
u1,p1,5,books
u1,p2,3.5,electronics

u2,p1,4,books
";

    #[test]
    fn test_parse_sample() {
        let ratings = parse_ratings_from_reader(SAMPLE.as_bytes(), "sample.csv").unwrap();
        assert_eq!(ratings.len(), 3);
        assert_eq!(ratings[0].reviewer_id, "u1");
        assert_eq!(ratings[1].stars, 3.5);
        assert_eq!(ratings[1].category, "electronics");
        assert_eq!(ratings[2].product_id, "p1");
    }

    #[test]
    fn test_invalid_stars_reports_line() {
        let input = "reviewer_id,product_id,stars,product_category\nu1,p1,five,books\n";
        let err = parse_ratings_from_reader(input.as_bytes(), "bad.csv").unwrap_err();
        match err {
            DataLoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "bad.csv");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_stars_rejected() {
        for value in ["NaN", "inf", "-inf"] {
            let input = format!(
                "reviewer_id,product_id,stars,product_category\nu1,p1,5,books\nu2,p3,{value},books\n"
            );
            let err = parse_ratings_from_reader(input.as_bytes(), "odd.csv").unwrap_err();
            match err {
                DataLoadError::ParseError { line, reason, .. } => {
                    assert_eq!(line, 3);
                    assert!(reason.contains("Non-finite"), "{reason}");
                }
                other => panic!("unexpected error for {value}: {other}"),
            }
        }
    }

    #[test]
    fn test_missing_fields() {
        let input = "reviewer_id,product_id,stars,product_category\nu1,p1\n";
        let err = parse_ratings_from_reader(input.as_bytes(), "short.csv").unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::FieldCountMismatch { expected: 4, found: 2, .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_ratings(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
