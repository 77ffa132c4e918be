//! String variant injection for categorical columns.

use super::sample_positions;
use crate::config::VariantStrategy;
use crate::error::Result;
use crate::utils::{
    DtypeCategory, get_dtype_category, percent_of, string_values, validate_percent,
};
use polars::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{debug, warn};

const OPERATION: &str = "variant insertion";

/// Symbols inserted by [`mutate_value`] at non-alphabetic positions.
pub const VARIANT_SYMBOLS: &str = "!@#$%^&*()_+{}[]|\\:;\"<>?,./";

/// Textual variants of `value` a string-mismatch check should flag.
///
/// Candidates, in order: first character case swapped, spaces replaced by
/// hyphens, trailing period, uppercase, lowercase, leading space. Candidates
/// equal to `value` or to an earlier candidate are dropped.
pub fn generate_variants(value: &str) -> Vec<String> {
    let candidates = [
        swap_first_case(value),
        value.replace(' ', "-"),
        format!("{}.", value),
        value.to_uppercase(),
        value.to_lowercase(),
        format!(" {}", value),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate != value && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

fn swap_first_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => {
            let mut swapped = flip_case(first);
            swapped.push_str(chars.as_str());
            swapped
        }
        None => String::new(),
    }
}

fn flip_case(c: char) -> String {
    if c.is_lowercase() {
        c.to_uppercase().collect()
    } else if c.is_uppercase() {
        c.to_lowercase().collect()
    } else {
        c.to_string()
    }
}

/// A single random mutation of `value`.
///
/// A random character position is picked: an alphabetic character has its
/// case flipped, anything else gets a random symbol from [`VARIANT_SYMBOLS`]
/// inserted in front of it. An empty value becomes a single symbol.
pub fn mutate_value<R: Rng + ?Sized>(value: &str, rng: &mut R) -> String {
    let symbols: Vec<char> = VARIANT_SYMBOLS.chars().collect();
    let symbol = symbols[rng.gen_range(0..symbols.len())];

    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return symbol.to_string();
    }

    let position = rng.gen_range(0..chars.len());
    let mut mutated = String::with_capacity(value.len() + symbol.len_utf8());
    for (i, &c) in chars.iter().enumerate() {
        if i == position {
            if c.is_alphabetic() {
                mutated.push_str(&flip_case(c));
                continue;
            }
            mutated.push(symbol);
        }
        mutated.push(c);
    }
    mutated
}

/// Replace `percent` of `column` with textual variants of one of its values.
///
/// A reference value is picked uniformly among the non-null values and
/// `round(N * percent / 100)` distinct rows are overwritten:
///
/// - [`VariantStrategy::SharedCandidates`]: each row gets a random member of
///   [`generate_variants`] for the reference value
/// - [`VariantStrategy::PerRowMutation`]: each row gets its own
///   [`mutate_value`] of the reference value
///
/// String and categorical columns keep their dtype; other columns come back
/// as strings. A column with fewer than two distinct values, or an empty
/// candidate set, is left unchanged.
pub fn insert_variants<R: Rng + ?Sized>(
    column: &Series,
    percent: f64,
    strategy: VariantStrategy,
    rng: &mut R,
) -> Result<Series> {
    validate_percent("percent", percent)?;

    let n = column.len();
    let size = percent_of(n, percent);
    if size == 0 {
        return Ok(column.clone());
    }

    let mut values = string_values(column)?;
    let distinct = values.iter().flatten().collect::<HashSet<_>>().len();
    if distinct == 1 {
        warn!(
            "Column '{}' holds a single distinct value; leaving it unchanged",
            column.name()
        );
        return Ok(column.clone());
    }

    let reference = {
        let present: Vec<&String> = values.iter().flatten().collect();
        match present.choose(rng) {
            Some(value) => value.to_string(),
            None => {
                warn!("Column '{}' has no values to vary", column.name());
                return Ok(column.clone());
            }
        }
    };

    let candidates = match strategy {
        VariantStrategy::SharedCandidates => {
            let candidates = generate_variants(&reference);
            if candidates.is_empty() {
                warn!(
                    "No variants of '{}' differ from it; '{}' left unchanged",
                    reference,
                    column.name()
                );
                return Ok(column.clone());
            }
            candidates
        }
        VariantStrategy::PerRowMutation => Vec::new(),
    };

    let rows = sample_positions(rng, n, size, OPERATION)?;
    debug!(
        "Replacing {} rows of '{}' with variants of '{}' ({:?})",
        rows.len(),
        column.name(),
        reference,
        strategy
    );

    for row in rows {
        values[row] = match strategy {
            VariantStrategy::SharedCandidates => candidates.choose(rng).cloned(),
            VariantStrategy::PerRowMutation => Some(mutate_value(&reference, rng)),
        };
    }

    let varied = Series::new(column.name().clone(), values);
    match get_dtype_category(column.dtype()) {
        DtypeCategory::String => Ok(varied.cast(column.dtype())?),
        _ => Ok(varied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn regions() -> Series {
        let values: Vec<&str> = (0..20)
            .map(|i| match i % 3 {
                0 => "New York",
                1 => "Boston",
                _ => "Chicago",
            })
            .collect();
        Series::new("region".into(), values)
    }

    #[test]
    fn test_generate_variants_for_words() {
        let variants = generate_variants("New York");
        assert_eq!(
            variants,
            vec![
                "new York".to_string(),
                "New-York".to_string(),
                "New York.".to_string(),
                "NEW YORK".to_string(),
                "new york".to_string(),
                " New York".to_string(),
            ]
        );
    }

    #[test]
    fn test_generate_variants_drops_identical_candidates() {
        let variants = generate_variants("42");
        assert_eq!(variants, vec!["42.".to_string(), " 42".to_string()]);
    }

    #[test]
    fn test_generate_variants_empty_value() {
        assert_eq!(generate_variants(""), vec![".".to_string(), " ".to_string()]);
    }

    #[test]
    fn test_mutate_value_flips_or_inserts() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let mutated = mutate_value("a1", &mut rng);
            let flipped = mutated == "A1";
            let inserted = mutated.len() == 3
                && mutated.starts_with('a')
                && mutated.ends_with('1')
                && VARIANT_SYMBOLS.contains(mutated.chars().nth(1).unwrap());
            assert!(flipped || inserted, "unexpected mutation {mutated}");
        }
    }

    #[test]
    fn test_mutate_empty_value() {
        let mut rng = StdRng::seed_from_u64(8);
        let mutated = mutate_value("", &mut rng);
        assert_eq!(mutated.chars().count(), 1);
        assert!(VARIANT_SYMBOLS.contains(mutated.as_str()));
    }

    #[test]
    fn test_zero_percent_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let column = regions();
        let varied =
            insert_variants(&column, 0.0, VariantStrategy::SharedCandidates, &mut rng).unwrap();
        assert!(varied.equals(&column));
    }

    #[test]
    fn test_shared_candidates_come_from_one_reference() {
        let mut rng = StdRng::seed_from_u64(2);
        let column = regions();
        let varied =
            insert_variants(&column, 50.0, VariantStrategy::SharedCandidates, &mut rng).unwrap();

        assert_eq!(varied.len(), column.len());
        let before = string_values(&column).unwrap();
        let after = string_values(&varied).unwrap();

        let originals = ["New York", "Boston", "Chicago"];
        let introduced: Vec<&str> = after
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|v| !originals.contains(v))
            .collect();
        assert!(!introduced.is_empty());

        let reference = originals
            .iter()
            .find(|o| generate_variants(o).iter().any(|v| v == introduced[0]))
            .expect("introduced value must be a variant of an original value");
        let candidates = generate_variants(reference);
        assert!(introduced.iter().all(|v| candidates.iter().any(|c| c == v)));

        let changed = before.iter().zip(after.iter()).filter(|(b, a)| b != a).count();
        assert!(changed <= 10);
    }

    #[test]
    fn test_per_row_mutation_changes_selected_rows() {
        let mut rng = StdRng::seed_from_u64(3);
        let column = regions();
        let varied =
            insert_variants(&column, 25.0, VariantStrategy::PerRowMutation, &mut rng).unwrap();

        assert_eq!(varied.len(), 20);
        assert_eq!(varied.dtype(), &DataType::String);
        let after = string_values(&varied).unwrap();
        let originals = ["New York", "Boston", "Chicago"];
        let mutated = after
            .iter()
            .flatten()
            .filter(|v| !originals.contains(&v.as_str()))
            .count();
        assert!(mutated <= 5);
    }

    #[test]
    fn test_all_null_column_is_noop() {
        let mut rng = StdRng::seed_from_u64(4);
        let column = Series::new("empty".into(), &[None::<&str>, None, None]);
        let varied =
            insert_variants(&column, 100.0, VariantStrategy::SharedCandidates, &mut rng).unwrap();
        assert_eq!(varied.null_count(), 3);
    }

    #[test]
    fn test_constant_column_is_degenerate_noop() {
        let column = Series::new("region".into(), vec!["a"; 6]);
        for strategy in [
            VariantStrategy::SharedCandidates,
            VariantStrategy::PerRowMutation,
        ] {
            let mut rng = StdRng::seed_from_u64(1);
            let varied = insert_variants(&column, 50.0, strategy, &mut rng).unwrap();
            assert!(varied.equals(&column), "{strategy:?} modified a constant column");
        }

        let with_nulls = Series::new("region".into(), &[Some("a"), None, Some("a"), None]);
        let mut rng = StdRng::seed_from_u64(1);
        let varied =
            insert_variants(&with_nulls, 100.0, VariantStrategy::SharedCandidates, &mut rng)
                .unwrap();
        assert!(varied.equals_missing(&with_nulls));
    }

    #[test]
    fn test_numeric_column_comes_back_as_strings() {
        let mut rng = StdRng::seed_from_u64(5);
        let column = Series::new("code".into(), &[1i64, 2, 3, 4]);
        let varied =
            insert_variants(&column, 100.0, VariantStrategy::SharedCandidates, &mut rng).unwrap();
        assert_eq!(varied.dtype(), &DataType::String);
        assert_eq!(varied.len(), 4);
    }
}
