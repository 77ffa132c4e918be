//! Feature/label leakage injection.

use crate::error::{CorruptionError, Result};
use crate::utils::{column_series, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Return `column + label * mean(column) * power`.
///
/// The added term makes the feature linearly dependent on the label, with a
/// strength proportional to `power` and to the feature's own scale. Both
/// columns must be numeric. `power == 0` and a zero-mean feature return the
/// feature unchanged (same values and dtype). A null on either side gives a
/// null in the result.
pub fn relate_column_to_label(
    df: &DataFrame,
    label_column: &str,
    column: &str,
    power: f64,
) -> Result<Series> {
    if !power.is_finite() || power < 0.0 {
        return Err(CorruptionError::invalid_parameter(
            "power",
            format!("{} is not a non-negative number", power),
        ));
    }

    let feature = column_series(df, column)?;
    let feature_values = numeric_values(&feature)?;
    let label = column_series(df, label_column)?;
    let label_values = numeric_values(&label)?;

    if power == 0.0 {
        return Ok(feature);
    }

    let mean = feature.mean().unwrap_or(0.0);
    if mean == 0.0 {
        debug!("'{}' has zero mean; label relation adds nothing", column);
        return Ok(feature);
    }

    let factor = mean * power;
    let related: Vec<Option<f64>> = feature_values
        .into_iter()
        .zip(label_values)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(x + y * factor),
            _ => None,
        })
        .collect();

    Ok(Series::new(feature.name().clone(), related))
}
