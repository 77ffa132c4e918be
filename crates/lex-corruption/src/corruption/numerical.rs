//! Gaussian noise injection for numeric columns.

use crate::config::NoiseScaling;
use crate::error::{CorruptionError, Result};
use crate::utils::numeric_values;
use polars::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Add Normal(`mean`, `std`) noise to every value of a numeric column.
///
/// One sample is drawn per row. With [`NoiseScaling::RelativeToMean`] each
/// sample is multiplied by the column mean before being added. Nulls stay
/// null. The result is a `Float64` column with the same name and length;
/// `mean == 0 && std == 0` returns the input untouched.
pub fn insert_numerical_drift<R: Rng + ?Sized>(
    column: &Series,
    mean: f64,
    std: f64,
    scaling: NoiseScaling,
    rng: &mut R,
) -> Result<Series> {
    if !mean.is_finite() {
        return Err(CorruptionError::invalid_parameter(
            "mean",
            "must be a finite number",
        ));
    }
    if !std.is_finite() || std < 0.0 {
        return Err(CorruptionError::invalid_parameter(
            "std",
            format!("{} is not a non-negative standard deviation", std),
        ));
    }

    let values = numeric_values(column)?;
    if mean == 0.0 && std == 0.0 {
        return Ok(column.clone());
    }

    let normal =
        Normal::new(mean, std).map_err(|e| CorruptionError::invalid_parameter("std", e.to_string()))?;

    let scale = match scaling {
        NoiseScaling::Absolute => 1.0,
        NoiseScaling::RelativeToMean => column.mean().unwrap_or(0.0),
    };

    debug!(
        "Drifting '{}' with N({}, {}) noise, scale {}",
        column.name(),
        mean,
        std,
        scale
    );

    let drifted: Vec<Option<f64>> = values
        .into_iter()
        .map(|value| {
            let noise = normal.sample(rng);
            value.map(|v| v + noise * scale)
        })
        .collect();

    Ok(Series::new(column.name().clone(), drifted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn prices() -> Series {
        Series::new("price".into(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
    }

    #[test]
    fn test_zero_parameters_is_noop() {
        let mut rng = StdRng::seed_from_u64(3);
        let column = Series::new("count".into(), &[1i64, 2, 3]);
        let drifted =
            insert_numerical_drift(&column, 0.0, 0.0, NoiseScaling::Absolute, &mut rng).unwrap();
        assert!(drifted.equals(&column));
        assert_eq!(drifted.dtype(), &DataType::Int64);
    }

    #[test]
    fn test_zero_std_is_mean_shift() {
        let mut rng = StdRng::seed_from_u64(3);
        let column = prices();
        let drifted =
            insert_numerical_drift(&column, 2.5, 0.0, NoiseScaling::Absolute, &mut rng).unwrap();

        let before = numeric_values(&column).unwrap();
        let after = numeric_values(&drifted).unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((a.unwrap() - b.unwrap() - 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_relative_scaling_multiplies_by_mean() {
        let mut rng = StdRng::seed_from_u64(3);
        let column = prices();
        let mean = column.mean().unwrap();
        let drifted =
            insert_numerical_drift(&column, 0.1, 0.0, NoiseScaling::RelativeToMean, &mut rng)
                .unwrap();

        let before = numeric_values(&column).unwrap();
        let after = numeric_values(&drifted).unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((a.unwrap() - b.unwrap() - 0.1 * mean).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_preserves_length_and_nulls() {
        let mut rng = StdRng::seed_from_u64(11);
        let column = Series::new("x".into(), &[Some(1.0), None, Some(3.0), Some(4.0)]);
        let drifted =
            insert_numerical_drift(&column, 0.0, 1.0, NoiseScaling::Absolute, &mut rng).unwrap();

        assert_eq!(drifted.len(), column.len());
        assert_eq!(drifted.name(), column.name());
        assert_eq!(drifted.null_count(), 1);
        assert!(drifted.get(1).unwrap().is_null());
    }

    #[test]
    fn test_same_seed_same_noise() {
        let column = prices();
        let a = insert_numerical_drift(
            &column,
            1.0,
            2.0,
            NoiseScaling::Absolute,
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();
        let b = insert_numerical_drift(
            &column,
            1.0,
            2.0,
            NoiseScaling::Absolute,
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_negative_std_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = insert_numerical_drift(&prices(), 0.0, -1.0, NoiseScaling::Absolute, &mut rng)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_string_column_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let column = Series::new("region".into(), &["a", "b"]);
        let err = insert_numerical_drift(&column, 1.0, 1.0, NoiseScaling::Absolute, &mut rng)
            .unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
    }
}
