//! Duplicate row injection.

use super::sample_positions;
use crate::error::{CorruptionError, Result};
use crate::utils::{percent_of, validate_percent};
use polars::prelude::*;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tracing::debug;

const OPERATION: &str = "duplicate insertion";

/// Overwrite `percent` of the rows of `df` with copies of a small pool of rows.
///
/// `rows_to_duplicate` rows are picked as the pool. Copies are drawn from
/// the pool with replacement under a random, non-uniform weighting (fresh on
/// every call), and written over distinct, uniformly chosen target rows.
/// When there are at least as many copies as pool rows, every pool row is
/// copied at least once. Row and column counts are unchanged; a target row
/// may receive a copy of itself.
pub fn insert_duplicates<R: Rng + ?Sized>(
    df: &DataFrame,
    rows_to_duplicate: usize,
    percent: f64,
    rng: &mut R,
) -> Result<DataFrame> {
    validate_percent("percent", percent)?;

    let n = df.height();
    let amount = percent_of(n, percent);
    if amount == 0 {
        return Ok(df.clone());
    }

    let sources = draw_duplicate_sources(n, rows_to_duplicate, amount, rng)?;
    let targets = sample_positions(rng, n, amount, OPERATION)?;

    let mut gather: Vec<IdxSize> = (0..n as IdxSize).collect();
    for (target, source) in targets.into_iter().zip(sources) {
        gather[target] = source as IdxSize;
    }

    debug!(
        "Overwrote {} of {} rows with duplicates of {} pool rows",
        amount, n, rows_to_duplicate
    );

    let indices = IdxCa::from_vec("idx".into(), gather);
    Ok(df.take(&indices)?)
}

/// Append `percent` of the row count as copies of a small pool of rows.
///
/// Pool selection and weighting are the same as [`insert_duplicates`]; the
/// copies are added after the last row instead of overwriting rows.
pub fn append_duplicates<R: Rng + ?Sized>(
    df: &DataFrame,
    rows_to_duplicate: usize,
    percent: f64,
    rng: &mut R,
) -> Result<DataFrame> {
    validate_percent("percent", percent)?;

    let n = df.height();
    let amount = percent_of(n, percent);
    if amount == 0 {
        return Ok(df.clone());
    }

    let sources = draw_duplicate_sources(n, rows_to_duplicate, amount, rng)?;
    let gather: Vec<IdxSize> = sources.into_iter().map(|s| s as IdxSize).collect();
    let copies = df.take(&IdxCa::from_vec("idx".into(), gather))?;

    debug!("Appended {} duplicate rows to {} rows", amount, n);
    Ok(df.vstack(&copies)?)
}

/// Pick the pool and draw `amount` source rows from it.
fn draw_duplicate_sources<R: Rng + ?Sized>(
    n: usize,
    rows_to_duplicate: usize,
    amount: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if rows_to_duplicate == 0 {
        return Err(CorruptionError::sampling(OPERATION, amount, 0));
    }
    let pool = sample_positions(rng, n, rows_to_duplicate, OPERATION)?;

    let weights: Vec<f64> = (0..pool.len())
        .map(|_| rng.gen_range(f64::EPSILON..1.0))
        .collect();
    let weighting = WeightedIndex::new(&weights)
        .map_err(|e| CorruptionError::invalid_parameter("rows_to_duplicate", e.to_string()))?;

    let mut sources = Vec::with_capacity(amount);
    if amount >= pool.len() {
        sources.extend(pool.iter().copied());
    }
    while sources.len() < amount {
        sources.push(pool[weighting.sample(rng)]);
    }
    Ok(sources)
}
