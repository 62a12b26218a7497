//! Min-max scaling of a similarity matrix into [0, 1].

use crate::error::{EngineError, Result};
use crate::similarity::SimilarityMatrix;

/// Value every entry takes when the matrix is single-valued
pub const DEGENERATE_SCALE_FALLBACK: f64 = 1.0;

/// Rescale every entry to `(value - min) / (max - min)` using the global
/// min and max over the whole matrix.
///
/// An empty matrix scales to an empty matrix. A matrix whose entries all
/// share one value returns [`EngineError::DegenerateScale`].
pub fn min_max_scale(similarities: &SimilarityMatrix) -> Result<SimilarityMatrix> {
    let Some((min, max)) = bounds(similarities) else {
        return Ok(SimilarityMatrix::new());
    };

    let range = max - min;
    if range == 0.0 {
        return Err(EngineError::DegenerateScale { value: min });
    }

    Ok(map_values(similarities, |value| (value - min) / range))
}

/// Like [`min_max_scale`], but maps a single-valued matrix to `fallback`
/// everywhere instead of failing.
pub fn min_max_scale_or(similarities: &SimilarityMatrix, fallback: f64) -> SimilarityMatrix {
    match min_max_scale(similarities) {
        Ok(scaled) => scaled,
        Err(EngineError::DegenerateScale { value }) => {
            tracing::warn!(
                "Similarity set is single-valued ({}), scaling every entry to {}",
                value,
                fallback
            );
            map_values(similarities, |_| fallback)
        }
    }
}

fn bounds(similarities: &SimilarityMatrix) -> Option<(f64, f64)> {
    similarities
        .values()
        .flat_map(|related| related.values().copied())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

fn map_values(similarities: &SimilarityMatrix, f: impl Fn(f64) -> f64) -> SimilarityMatrix {
    similarities
        .iter()
        .map(|(i, related)| {
            let scaled = related.iter().map(|(j, value)| (j.clone(), f(*value))).collect();
            (i.clone(), scaled)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(entries: &[(&str, &str, f64)]) -> SimilarityMatrix {
        let mut m = SimilarityMatrix::new();
        for (i, j, v) in entries {
            m.entry(i.to_string()).or_default().insert(j.to_string(), *v);
        }
        m
    }

    #[test]
    fn test_extremes_map_to_zero_and_one() {
        let m = matrix(&[("a", "b", 23.0), ("b", "a", 23.0), ("a", "c", 3.0), ("c", "a", 13.0)]);
        let scaled = min_max_scale(&m).unwrap();

        assert_eq!(scaled["a"]["b"], 1.0);
        assert_eq!(scaled["b"]["a"], 1.0);
        assert_eq!(scaled["a"]["c"], 0.0);
        assert_eq!(scaled["c"]["a"], 0.5);
    }

    #[test]
    fn test_all_values_within_unit_interval() {
        let m = matrix(&[("a", "b", -4.0), ("b", "c", 7.5), ("c", "d", 100.0), ("d", "a", 0.0)]);
        let scaled = min_max_scale(&m).unwrap();

        for related in scaled.values() {
            for value in related.values() {
                assert!((0.0..=1.0).contains(value));
            }
        }
    }

    #[test]
    fn test_single_valued_matrix_is_degenerate() {
        let m = matrix(&[("p1", "p2", 15.0), ("p2", "p1", 15.0)]);
        assert_eq!(
            min_max_scale(&m),
            Err(EngineError::DegenerateScale { value: 15.0 })
        );
    }

    #[test]
    fn test_degenerate_fallback_applies_everywhere() {
        let m = matrix(&[("p1", "p2", 15.0), ("p2", "p1", 15.0)]);
        let scaled = min_max_scale_or(&m, DEGENERATE_SCALE_FALLBACK);

        assert_eq!(scaled["p1"]["p2"], 1.0);
        assert_eq!(scaled["p2"]["p1"], 1.0);
    }

    #[test]
    fn test_empty_matrix_scales_to_empty() {
        assert!(min_max_scale(&SimilarityMatrix::new()).unwrap().is_empty());
        assert!(min_max_scale_or(&SimilarityMatrix::new(), 1.0).is_empty());
    }

    #[test]
    fn test_fallback_not_used_when_range_positive() {
        let m = matrix(&[("a", "b", 1.0), ("b", "a", 2.0)]);
        let scaled = min_max_scale_or(&m, 0.42);
        assert_eq!(scaled["a"]["b"], 0.0);
        assert_eq!(scaled["b"]["a"], 1.0);
    }
}
