//! Helper statistics for choosing corruption parameters.
//!
//! These mirror the ranges an interactive front-end offers: a drift slider
//! should span a few standard deviations of the column, and a category
//! slider should start at the category's current share.

use crate::dataset::{Dataset, LabelKind};
use crate::error::{CorruptionError, Result};
use crate::utils::{column_series, numeric_values, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Default share of values trimmed from each tail by
/// [`std_without_outliers`].
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 0.025;

/// Suggested bounds for numerical drift parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftRange {
    pub max_mean: f64,
    pub max_std: f64,
    pub step: f64,
    /// Mean shift that produces a visible but moderate drift.
    pub default_mean: f64,
}

/// Population standard deviation of the values lying strictly between the
/// `outlier_threshold` and `1 - outlier_threshold` quantiles.
///
/// Returns `None` when no value survives the trimming.
pub fn std_without_outliers(column: &Series, outlier_threshold: f64) -> Result<Option<f64>> {
    if !(0.0..0.5).contains(&outlier_threshold) {
        return Err(CorruptionError::invalid_parameter(
            "outlier_threshold",
            format!("{} must be in [0, 0.5)", outlier_threshold),
        ));
    }

    let mut values: Vec<f64> = numeric_values(column)?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let lower = quantile(&values, outlier_threshold);
    let upper = quantile(&values, 1.0 - outlier_threshold);
    let kept: Vec<f64> = values
        .into_iter()
        .filter(|&v| v > lower && v < upper)
        .collect();

    Ok(population_std(&kept))
}

/// Linear-interpolation quantile of sorted, non-empty `values`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * fraction
}

fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Current share of `category` in `column`, in percent, floored to two
/// decimals.
pub fn category_percent(column: &Series, category: &str) -> Result<f64> {
    if column.is_empty() {
        return Ok(0.0);
    }
    let count = string_values(column)?
        .iter()
        .filter(|v| v.as_deref() == Some(category))
        .count();
    let ratio = count as f64 / column.len() as f64;
    Ok((ratio * 10_000.0).floor() / 100.0)
}

/// Suggested drift bounds for a numeric `column` of `dataset`.
///
/// A regression label gets `5 * std_without_outliers` for both bounds with
/// steps of a twentieth of that deviation. A feature gets three times its
/// mean and standard deviation with a hundredth of the larger bound as
/// step. Classification labels are drifted by category instead and are
/// rejected.
pub fn suggest_drift_range(dataset: &Dataset, column: &str) -> Result<DriftRange> {
    let series = column_series(dataset.data(), column)?;

    if dataset.label_name() == Some(column) {
        if dataset.label_kind()? == Some(LabelKind::Classification) {
            return Err(CorruptionError::invalid_parameter(
                "column",
                format!("'{}' is a classification label; drift it by category", column),
            ));
        }
        let std = std_without_outliers(&series, DEFAULT_OUTLIER_THRESHOLD)?.unwrap_or(0.0);
        return Ok(DriftRange {
            max_mean: std * 5.0,
            max_std: std * 5.0,
            step: std / 20.0,
            default_mean: std / 2.0,
        });
    }

    let values: Vec<f64> = numeric_values(&series)?.into_iter().flatten().collect();
    let mean = if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    };
    let std = population_std(&values).unwrap_or(0.0);

    let max_mean = mean * 3.0;
    let max_std = std * 3.0;
    Ok(DriftRange {
        max_mean,
        max_std,
        step: max_mean.abs().max(max_std) / 100.0,
        default_mean: 0.0,
    })
}
