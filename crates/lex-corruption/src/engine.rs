//! Plan execution.
//!
//! [`CorruptionEngine`] owns the random generator and runs the steps of a
//! [`CorruptionPlan`] against a [`Dataset`], one after the other.

use crate::config::{CorruptionPlan, CorruptionStep, DuplicateMode};
use crate::corruption::{
    append_duplicates, insert_categorical_drift, insert_duplicates, insert_numerical_drift,
    insert_variants, relate_column_to_label,
};
use crate::dataset::Dataset;
use crate::error::{CorruptionError, Result, ResultExt};
use crate::types::{AppliedStep, CorruptionOutcome, CorruptionReport};
use crate::utils::{column_series, count_changed_cells, count_changed_values};
use chrono::Local;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Runs corruption plans with a single, optionally seeded, generator.
///
/// Two engines created with the same seed produce identical output for the
/// same dataset and plan.
pub struct CorruptionEngine {
    rng: StdRng,
    seed: Option<u64>,
}

static_assertions::assert_impl_all!(CorruptionEngine: Send);

impl CorruptionEngine {
    /// Create an engine. `None` seeds the generator from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, seed }
    }

    /// Create an engine seeded from the plan's seed.
    pub fn from_plan(plan: &CorruptionPlan) -> Self {
        Self::new(plan.seed)
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Validate `plan` and apply its steps to `dataset` in order.
    ///
    /// The input dataset is not modified. The first failing step aborts the
    /// run; its error carries the step number and kind as context.
    pub fn apply(&mut self, dataset: &Dataset, plan: &CorruptionPlan) -> Result<CorruptionOutcome> {
        plan.validate()
            .map_err(|e| CorruptionError::InvalidPlan(e.to_string()))?;

        info!(
            "Applying {} corruption steps to {} rows",
            plan.steps.len(),
            dataset.n_samples()
        );

        let rows_before = dataset.n_samples();
        let mut current = dataset.clone();
        let mut applied = Vec::with_capacity(plan.steps.len());

        for (i, step) in plan.steps.iter().enumerate() {
            let index = i + 1;
            info!("Step {}/{}: {}", index, plan.steps.len(), step.describe());

            let (next, changed_cells) = self
                .apply_step(&current, step)
                .context(format!("Step {} ({})", index, step.kind()))?;

            debug!("Step {} changed {} cells", index, changed_cells);
            applied.push(AppliedStep {
                index,
                kind: step.kind().to_string(),
                column: step.column().map(str::to_string),
                description: step.describe(),
                changed_cells,
            });
            current = next;
        }

        let report = CorruptionReport {
            generated_at: Local::now().to_rfc3339(),
            seed: self.seed,
            rows_before,
            rows_after: current.n_samples(),
            columns: current.data().width(),
            steps: applied,
        };

        info!(
            "Corruption complete: {} cells changed, {} -> {} rows",
            report.total_changed_cells(),
            report.rows_before,
            report.rows_after
        );

        Ok(CorruptionOutcome {
            dataset: current,
            report,
        })
    }

    /// Apply a single step, returning the new dataset and the number of
    /// changed cells.
    pub fn apply_step(&mut self, dataset: &Dataset, step: &CorruptionStep) -> Result<(Dataset, usize)> {
        let data = dataset.data();

        match step {
            CorruptionStep::NumericalDrift {
                column,
                mean,
                std,
                scaling,
            } => {
                let original = column_series(data, column)?;
                let drifted =
                    insert_numerical_drift(&original, *mean, *std, *scaling, &mut self.rng)?;
                self.replace_column(dataset, column, &original, drifted)
            }
            CorruptionStep::CategoricalDrift {
                column,
                percent,
                category,
            } => {
                let original = column_series(data, column)?;
                let drifted = insert_categorical_drift(&original, *percent, category, &mut self.rng)?;
                self.replace_column(dataset, column, &original, drifted)
            }
            CorruptionStep::Duplicates {
                rows_to_duplicate,
                percent,
                mode,
            } => {
                let corrupted = match mode {
                    DuplicateMode::Replace => {
                        insert_duplicates(data, *rows_to_duplicate, *percent, &mut self.rng)?
                    }
                    DuplicateMode::Append => {
                        append_duplicates(data, *rows_to_duplicate, *percent, &mut self.rng)?
                    }
                };
                let changed = count_changed_cells(data, &corrupted)?;
                Ok((dataset.with_data(corrupted)?, changed))
            }
            CorruptionStep::LabelCorrelation { column, power } => {
                let label = dataset.label_name().ok_or_else(|| {
                    CorruptionError::invalid_parameter(
                        "label",
                        "label correlation needs a dataset with a label column",
                    )
                })?;
                let original = column_series(data, column)?;
                let related = relate_column_to_label(data, label, column, *power)?;
                self.replace_column(dataset, column, &original, related)
            }
            CorruptionStep::Variants {
                column,
                percent,
                strategy,
            } => {
                let original = column_series(data, column)?;
                let varied = insert_variants(&original, *percent, *strategy, &mut self.rng)?;
                self.replace_column(dataset, column, &original, varied)
            }
        }
    }

    fn replace_column(
        &self,
        dataset: &Dataset,
        column: &str,
        original: &Series,
        corrupted: Series,
    ) -> Result<(Dataset, usize)> {
        let changed = count_changed_values(original, &corrupted)?;
        let mut data = dataset.data().clone();
        data.replace(column, corrupted)?;
        Ok((dataset.with_data(data)?, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariantStrategy;

    fn dataset() -> Dataset {
        let df = df!(
            "price" => (0..40).map(|v| 10.0 + v as f64).collect::<Vec<_>>(),
            "region" => (0..40).map(|v| ["north", "south", "east", "west"][v % 4]).collect::<Vec<_>>(),
            "target" => (0..40).map(|v| (v % 3) as i64).collect::<Vec<_>>(),
        )
        .unwrap();
        Dataset::new(df).with_label("target").unwrap()
    }

    fn full_plan(seed: u64) -> CorruptionPlan {
        CorruptionPlan::builder()
            .seed(seed)
            .numerical_drift("price", 1.0, 0.5)
            .categorical_drift("target", 60.0, "1")
            .duplicates(3, 10.0)
            .label_correlation("price", 0.5)
            .variants("region", 10.0, VariantStrategy::SharedCandidates)
            .build()
            .unwrap()
    }

    #[test]
    fn test_apply_full_plan() {
        let input = dataset();
        let plan = full_plan(42);
        let outcome = CorruptionEngine::from_plan(&plan).apply(&input, &plan).unwrap();

        assert_eq!(outcome.report.steps.len(), 5);
        assert_eq!(outcome.report.rows_before, 40);
        assert_eq!(outcome.report.rows_after, 40);
        assert_eq!(outcome.report.seed, Some(42));
        assert_eq!(outcome.dataset.label_name(), Some("target"));
        assert!(outcome.report.steps.iter().all(|s| s.changed_cells > 0));

        // Input untouched
        assert!(input.data().equals(&dataset().into_data()));
    }

    #[test]
    fn test_same_seed_same_output() {
        let input = dataset();
        let plan = full_plan(7);
        let a = CorruptionEngine::new(Some(7)).apply(&input, &plan).unwrap();
        let b = CorruptionEngine::new(Some(7)).apply(&input, &plan).unwrap();
        assert!(a.dataset.data().equals_missing(b.dataset.data()));
    }

    #[test]
    fn test_append_mode_counts_new_rows() {
        let input = dataset();
        let plan = CorruptionPlan::builder()
            .duplicates_with_mode(2, 10.0, DuplicateMode::Append)
            .build()
            .unwrap();
        let outcome = CorruptionEngine::new(Some(1)).apply(&input, &plan).unwrap();

        assert_eq!(outcome.report.rows_after, 44);
        assert_eq!(outcome.report.steps[0].changed_cells, 4 * 3);
    }

    #[test]
    fn test_failing_step_reports_context() {
        let input = dataset();
        let plan = CorruptionPlan::builder()
            .duplicates(2, 5.0)
            .numerical_drift("missing", 1.0, 1.0)
            .build()
            .unwrap();

        let err = CorruptionEngine::new(Some(1))
            .apply(&input, &plan)
            .unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(err.to_string().contains("Step 2 (numerical_drift)"));
    }

    #[test]
    fn test_label_correlation_needs_label() {
        let unlabeled = Dataset::new(dataset().into_data());
        let plan = CorruptionPlan::builder()
            .label_correlation("price", 1.0)
            .build()
            .unwrap();
        let err = CorruptionEngine::new(None).apply(&unlabeled, &plan).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_invalid_plan_rejected_before_running() {
        let plan = CorruptionPlan {
            seed: None,
            steps: vec![CorruptionStep::Variants {
                column: "region".to_string(),
                percent: 250.0,
                strategy: VariantStrategy::SharedCandidates,
            }],
        };
        let err = CorruptionEngine::new(None).apply(&dataset(), &plan).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PLAN");
    }
}
