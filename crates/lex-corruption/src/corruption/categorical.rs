//! Category share drift for categorical columns.

use super::sample_from;
use crate::error::Result;
use crate::utils::{series_from_strings, string_values, validate_percent};
use polars::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const OPERATION: &str = "categorical drift";

/// Move the share of `category` in `column` to `percent`.
///
/// The number of rows to change is `round(N * (percent / 100 - current))`.
/// When it is positive, that many rows holding other values (nulls included)
/// are overwritten with `category`. When it is negative, that many rows
/// holding `category` are overwritten with a random other category of the
/// column. Values are matched on their string rendering, so integer class
/// labels can be targeted with `"2"`. The column keeps its dtype.
///
/// A column with no other category to move rows into is returned unchanged.
pub fn insert_categorical_drift<R: Rng + ?Sized>(
    column: &Series,
    percent: f64,
    category: &str,
    rng: &mut R,
) -> Result<Series> {
    validate_percent("percent", percent)?;

    let n = column.len();
    if n == 0 {
        return Ok(column.clone());
    }

    let mut values = string_values(column)?;
    let (matching, others): (Vec<usize>, Vec<usize>) =
        (0..n).partition(|&i| values[i].as_deref() == Some(category));

    let current_ratio = matching.len() as f64 / n as f64;
    let amount_to_replace = (n as f64 * (percent / 100.0 - current_ratio)).round() as i64;

    debug!(
        "'{}': category '{}' at {:.4}, target {:.4}, replacing {}",
        column.name(),
        category,
        current_ratio,
        percent / 100.0,
        amount_to_replace
    );

    if amount_to_replace == 0 {
        return Ok(column.clone());
    }

    if amount_to_replace > 0 {
        let indices = sample_from(rng, &others, amount_to_replace as usize, OPERATION)?;
        for index in indices {
            values[index] = Some(category.to_string());
        }
    } else {
        let amount = amount_to_replace.unsigned_abs() as usize;
        let replacements: Vec<String> = values
            .iter()
            .flatten()
            .filter(|v| v.as_str() != category)
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let indices = sample_from(rng, &matching, amount, OPERATION)?;
        if replacements.is_empty() {
            warn!(
                "Column '{}' has no category other than '{}'; leaving it unchanged",
                column.name(),
                category
            );
            return Ok(column.clone());
        }

        for index in indices {
            values[index] = replacements.choose(rng).cloned();
        }
    }

    series_from_strings(column.name().clone(), values, column.dtype())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::string_values;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn count(series: &Series, category: &str) -> usize {
        string_values(series)
            .unwrap()
            .iter()
            .filter(|v| v.as_deref() == Some(category))
            .count()
    }

    #[test]
    fn test_raises_share_to_target() {
        let mut rng = StdRng::seed_from_u64(42);
        let column = Series::new("target".into(), &[1i64, 1, 1, 1, 2, 2, 2, 2, 3, 3]);
        let drifted = insert_categorical_drift(&column, 50.0, "3", &mut rng).unwrap();

        assert_eq!(drifted.len(), 10);
        assert_eq!(drifted.dtype(), &DataType::Int64);
        assert_eq!(count(&drifted, "3"), 5);
    }

    #[test]
    fn test_lowers_share_with_other_categories() {
        let mut rng = StdRng::seed_from_u64(42);
        let column = Series::new(
            "species".into(),
            &["a", "a", "a", "a", "a", "a", "b", "c", "b", "c"],
        );
        let drifted = insert_categorical_drift(&column, 20.0, "a", &mut rng).unwrap();

        assert_eq!(count(&drifted, "a"), 2);
        let values = string_values(&drifted).unwrap();
        assert!(
            values
                .iter()
                .flatten()
                .all(|v| ["a", "b", "c"].contains(&v.as_str()))
        );
    }

    #[test]
    fn test_only_changes_needed_positions() {
        let mut rng = StdRng::seed_from_u64(1);
        let column = Series::new("c".into(), &["x", "y", "y", "y", "y", "y", "y", "y"]);
        let drifted = insert_categorical_drift(&column, 50.0, "x", &mut rng).unwrap();

        let before = string_values(&column).unwrap();
        let after = string_values(&drifted).unwrap();
        // Positions that were already "x" stay "x"
        assert_eq!(after[0].as_deref(), Some("x"));
        let changed = before.iter().zip(after.iter()).filter(|(b, a)| b != a).count();
        assert_eq!(changed, 3);
    }

    #[test]
    fn test_current_share_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let column = Series::new("c".into(), &["x", "y", "x", "y"]);
        let drifted = insert_categorical_drift(&column, 50.0, "x", &mut rng).unwrap();
        assert!(drifted.equals(&column));
    }

    #[test]
    fn test_ratio_within_one_row_of_target() {
        let values: Vec<&str> = (0..37)
            .map(|i| if i % 3 == 0 { "red" } else { "blue" })
            .collect();
        let column = Series::new("color".into(), values);

        for (seed, percent) in [(1u64, 0.0), (2, 33.3), (3, 61.0), (4, 100.0)] {
            let mut rng = StdRng::seed_from_u64(seed);
            let drifted = insert_categorical_drift(&column, percent, "red", &mut rng).unwrap();
            let ratio = count(&drifted, "red") as f64 / 37.0;
            assert!(
                (ratio - percent / 100.0).abs() <= 1.0 / 37.0,
                "percent {percent} gave ratio {ratio}"
            );
        }
    }

    #[test]
    fn test_constant_column_is_degenerate_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let column = Series::new("c".into(), &["x", "x", "x", "x"]);
        let drifted = insert_categorical_drift(&column, 0.0, "x", &mut rng).unwrap();
        assert!(drifted.equals(&column));
    }

    #[test]
    fn test_boolean_column_keeps_dtype() {
        let mut rng = StdRng::seed_from_u64(1);
        let column = Series::new("flag".into(), &[true, true, true, false]);
        let drifted = insert_categorical_drift(&column, 50.0, "true", &mut rng).unwrap();

        assert_eq!(drifted.dtype(), &DataType::Boolean);
        assert_eq!(count(&drifted, "true"), 2);
        assert_eq!(count(&drifted, "false"), 2);
    }

    #[test]
    fn test_invalid_percent_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let column = Series::new("c".into(), &["x", "y"]);
        let err = insert_categorical_drift(&column, 101.0, "x", &mut rng).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }
}
