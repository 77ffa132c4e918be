//! Corruption injectors.
//!
//! Each injector is a pure function over a polars `Series` or `DataFrame`:
//! it reads its input, draws randomness only from the generator it is given,
//! and returns a new column or table. Inputs are never modified in place.
//!
//! - [`insert_numerical_drift`] adds gaussian noise to a numeric column
//! - [`insert_categorical_drift`] moves the share of one category
//! - [`insert_duplicates`] / [`append_duplicates`] introduce duplicate rows
//! - [`relate_column_to_label`] leaks the label into a feature
//! - [`insert_variants`] replaces values with textual variants of one value

mod categorical;
mod duplicates;
mod label;
mod numerical;
mod variants;

pub use categorical::insert_categorical_drift;
pub use duplicates::{append_duplicates, insert_duplicates};
pub use label::relate_column_to_label;
pub use numerical::insert_numerical_drift;
pub use variants::{VARIANT_SYMBOLS, generate_variants, insert_variants, mutate_value};

use crate::error::{CorruptionError, Result};
use rand::Rng;

/// Pick `amount` distinct positions out of `0..length`, uniformly.
///
/// The population size is checked before sampling so that an oversized
/// request surfaces as [`CorruptionError::Sampling`] naming `operation`.
pub(crate) fn sample_positions<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    amount: usize,
    operation: &str,
) -> Result<Vec<usize>> {
    if amount > length {
        return Err(CorruptionError::sampling(operation, amount, length));
    }
    Ok(rand::seq::index::sample(rng, length, amount).into_vec())
}

/// Pick `amount` distinct entries of `population`, uniformly.
pub(crate) fn sample_from<R: Rng + ?Sized>(
    rng: &mut R,
    population: &[usize],
    amount: usize,
    operation: &str,
) -> Result<Vec<usize>> {
    Ok(sample_positions(rng, population.len(), amount, operation)?
        .into_iter()
        .map(|i| population[i])
        .collect())
}
