//! Data Corruption Injection Library
//!
//! Parameterized, reproducible corruptions for tabular data, built with Rust
//! and Polars. Corrupted datasets are meant to be fed to data-quality and
//! drift checks to show how they react.
//!
//! # Overview
//!
//! - **Numerical drift**: gaussian noise, absolute or relative to the mean
//! - **Categorical drift**: move one category's share to a target percentage
//! - **Duplicates**: overwrite or append rows copied from a small pool
//! - **Label leakage**: make a feature linearly depend on the label
//! - **String variants**: case, punctuation and spacing variants of one value
//!
//! Every injector is a pure function taking an explicit random generator, so
//! a seeded generator gives the same output every time.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_corruption::{CorruptionEngine, CorruptionPlan, Dataset, VariantStrategy};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("iris.csv".into()))?
//!     .finish()?;
//! let dataset = Dataset::new(df).with_label("target")?;
//!
//! let plan = CorruptionPlan::builder()
//!     .seed(42)
//!     .categorical_drift("target", 60.0, "1")
//!     .duplicates(5, 10.0)
//!     .build()?;
//!
//! let outcome = CorruptionEngine::from_plan(&plan).apply(&dataset, &plan)?;
//! println!("{} cells changed", outcome.report.total_changed_cells());
//! ```
//!
//! # Calling injectors directly
//!
//! ```rust,ignore
//! use lex_corruption::corruption::insert_categorical_drift;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let drifted = insert_categorical_drift(&column, 50.0, "3", &mut rng)?;
//! ```

pub mod config;
pub mod corruption;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod reporting;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, CorruptionPlan, CorruptionPlanBuilder, CorruptionStep, DuplicateMode,
    NoiseScaling, VariantStrategy,
};
pub use corruption::{
    append_duplicates, generate_variants, insert_categorical_drift, insert_duplicates,
    insert_numerical_drift, insert_variants, mutate_value, relate_column_to_label,
};
pub use dataset::{Dataset, LabelKind};
pub use engine::CorruptionEngine;
pub use error::{CorruptionError, Result as CorruptionResult, ResultExt};
pub use reporting::ReportWriter;
pub use stats::{DriftRange, category_percent, std_without_outliers, suggest_drift_range};
pub use types::{AppliedStep, CorruptionOutcome, CorruptionReport};
