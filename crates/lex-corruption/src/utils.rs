//! Shared utilities for the corruption engine.
//!
//! This module contains the column conversion and parameter helpers used by
//! every injector so that dtype handling and percent rounding behave the same
//! way everywhere.

use crate::error::{CorruptionError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for corruption purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Boolean type
    Boolean,
    /// String/categorical type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    is_numeric_dtype(dtype) && !matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Conversion Utilities
// =============================================================================

/// Read a numeric Series as `f64` values, keeping nulls.
///
/// Returns [`CorruptionError::TypeMismatch`] for non-numeric columns.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    if !is_numeric_dtype(series.dtype()) {
        return Err(CorruptionError::TypeMismatch {
            column: series.name().to_string(),
            expected: "numeric".to_string(),
            actual: format!("{:?}", series.dtype()),
        });
    }

    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Read any Series as its string rendering, keeping nulls.
///
/// Integer class labels render as `"1"`, `"2"`, ... which lets categorical
/// corruptions treat them exactly like string categories.
pub fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Build a Series from string values and cast it back to `dtype`.
///
/// Boolean columns are parsed from `"true"`/`"false"` since polars has no
/// string to boolean cast.
pub fn series_from_strings(
    name: PlSmallStr,
    values: Vec<Option<String>>,
    dtype: &DataType,
) -> Result<Series> {
    match dtype {
        DataType::String => Ok(Series::new(name, values)),
        DataType::Boolean => {
            let flags = values
                .into_iter()
                .map(|v| match v.as_deref() {
                    None => Ok(None),
                    Some("true") => Ok(Some(true)),
                    Some("false") => Ok(Some(false)),
                    Some(other) => Err(CorruptionError::TypeMismatch {
                        column: name.to_string(),
                        expected: "\"true\" or \"false\"".to_string(),
                        actual: format!("'{}'", other),
                    }),
                })
                .collect::<Result<Vec<Option<bool>>>>()?;
            Ok(Series::new(name, flags))
        }
        _ => Ok(Series::new(name, values).cast(dtype)?),
    }
}

/// Fetch a column of `df` as a Series, mapping a missing column to
/// [`CorruptionError::ColumnNotFound`].
pub fn column_series(df: &DataFrame, name: &str) -> Result<Series> {
    let column = df
        .column(name)
        .map_err(|_| CorruptionError::ColumnNotFound(name.to_string()))?;
    Ok(column.as_materialized_series().clone())
}

// =============================================================================
// Parameter Utilities
// =============================================================================

/// Reject percentages outside `[0, 100]`.
pub fn validate_percent(parameter: &str, percent: f64) -> Result<()> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(CorruptionError::invalid_parameter(
            parameter,
            format!("{} is not a percentage between 0 and 100", percent),
        ));
    }
    Ok(())
}

/// Number of rows out of `total` covered by `percent`, rounded and capped at
/// `total`.
pub fn percent_of(total: usize, percent: f64) -> usize {
    let amount = (total as f64 * percent / 100.0).round();
    (amount.max(0.0) as usize).min(total)
}

// =============================================================================
// Comparison Utilities
// =============================================================================

/// Count positions whose values differ between two Series.
///
/// Rows present in only one of the two Series count as changed.
pub fn count_changed_values(before: &Series, after: &Series) -> Result<usize> {
    let before = string_values(before)?;
    let after = string_values(after)?;
    let overlap = before.len().min(after.len());

    let changed = before
        .iter()
        .zip(after.iter())
        .filter(|(b, a)| b != a)
        .count();

    Ok(changed + (before.len() - overlap) + (after.len() - overlap))
}

/// Count changed cells across every column `before` and `after` share.
pub fn count_changed_cells(before: &DataFrame, after: &DataFrame) -> Result<usize> {
    let mut changed = 0;
    for column in before.get_columns() {
        let name = column.name().as_str();
        if let Ok(other) = after.column(name) {
            changed += count_changed_values(
                column.as_materialized_series(),
                other.as_materialized_series(),
            )?;
        }
    }
    Ok(changed)
}

// =============================================================================
// Tests
// =============================================================================
