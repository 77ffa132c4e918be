//! Configuration types for corruption plans.
//!
//! A [`CorruptionPlan`] is an ordered list of [`CorruptionStep`]s plus an
//! optional seed. Plans are plain data: they can be built in code with
//! [`CorruptionPlan::builder()`] or read from JSON.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// How numerical drift noise relates to the column's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoiseScaling {
    /// Noise is added in the column's native units.
    #[default]
    Absolute,
    /// Noise is multiplied by the column's mean before being added, so the
    /// same parameters give a comparable relative drift on any scale.
    RelativeToMean,
}

/// How string variants are produced for the selected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariantStrategy {
    /// Build one candidate set from the reference value and give each row a
    /// random member of it.
    #[default]
    SharedCandidates,
    /// Give each row its own single-character mutation of the reference value.
    PerRowMutation,
}

/// Whether duplicated rows overwrite existing rows or are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMode {
    /// Overwrite randomly chosen rows; row count is unchanged.
    #[default]
    Replace,
    /// Append the duplicated rows to the end of the table.
    Append,
}

/// A single corruption applied to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorruptionStep {
    /// Add Normal(mean, std) noise to a numeric column.
    NumericalDrift {
        column: String,
        mean: f64,
        std: f64,
        #[serde(default)]
        scaling: NoiseScaling,
    },
    /// Move the share of `category` in a column to `percent`.
    CategoricalDrift {
        column: String,
        percent: f64,
        #[serde(deserialize_with = "deserialize_category")]
        category: String,
    },
    /// Overwrite (or append) `percent` of the rows with copies drawn from a
    /// pool of `rows_to_duplicate` rows.
    Duplicates {
        rows_to_duplicate: usize,
        percent: f64,
        #[serde(default)]
        mode: DuplicateMode,
    },
    /// Leak the label into a numeric feature.
    LabelCorrelation { column: String, power: f64 },
    /// Replace `percent` of a column with textual variants of one value.
    Variants {
        column: String,
        percent: f64,
        #[serde(default)]
        strategy: VariantStrategy,
    },
}

/// Categories may be written as JSON strings or as bare numbers (`3`) when
/// the column holds integer class labels.
fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "category must be a string or number, got {}",
            other
        ))),
    }
}

impl CorruptionStep {
    /// Short machine-friendly name of the step kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NumericalDrift { .. } => "numerical_drift",
            Self::CategoricalDrift { .. } => "categorical_drift",
            Self::Duplicates { .. } => "duplicates",
            Self::LabelCorrelation { .. } => "label_correlation",
            Self::Variants { .. } => "variants",
        }
    }

    /// The column the step corrupts, if it targets a single column.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::NumericalDrift { column, .. }
            | Self::CategoricalDrift { column, .. }
            | Self::LabelCorrelation { column, .. }
            | Self::Variants { column, .. } => Some(column),
            Self::Duplicates { .. } => None,
        }
    }

    /// Human-readable description for reports and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::NumericalDrift {
                column,
                mean,
                std,
                scaling,
            } => format!(
                "Added gaussian noise (mean {}, std {}, {:?}) to '{}'",
                mean, std, scaling, column
            ),
            Self::CategoricalDrift {
                column,
                percent,
                category,
            } => format!(
                "Drifted category '{}' of '{}' to {:.2}%",
                category, column, percent
            ),
            Self::Duplicates {
                rows_to_duplicate,
                percent,
                mode,
            } => format!(
                "Inserted duplicates of {} rows over {:.2}% of the data ({:?})",
                rows_to_duplicate, percent, mode
            ),
            Self::LabelCorrelation { column, power } => {
                format!("Related '{}' to the label with power {}", column, power)
            }
            Self::Variants {
                column,
                percent,
                strategy,
            } => format!(
                "Inserted string variants into {:.2}% of '{}' ({:?})",
                percent, column, strategy
            ),
        }
    }

    fn validate(&self, index: usize) -> Result<(), ConfigValidationError> {
        if let Some(column) = self.column()
            && column.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyColumn { step: index });
        }

        match self {
            Self::NumericalDrift { mean, std, .. } => {
                check_finite(index, "mean", *mean)?;
                check_non_negative(index, "std", *std)
            }
            Self::CategoricalDrift { percent, .. }
            | Self::Duplicates { percent, .. }
            | Self::Variants { percent, .. } => check_percent(index, *percent),
            Self::LabelCorrelation { power, .. } => check_non_negative(index, "power", *power),
        }
    }
}

fn check_finite(step: usize, field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !value.is_finite() {
        return Err(ConfigValidationError::NotFinite {
            step,
            field: field.to_string(),
        });
    }
    Ok(())
}

fn check_non_negative(step: usize, field: &str, value: f64) -> Result<(), ConfigValidationError> {
    check_finite(step, field, value)?;
    if value < 0.0 {
        return Err(ConfigValidationError::NegativeValue {
            step,
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_percent(step: usize, value: f64) -> Result<(), ConfigValidationError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigValidationError::InvalidPercent { step, value });
    }
    Ok(())
}

/// An ordered list of corruptions to apply to a dataset.
///
/// # Example
///
/// ```rust,ignore
/// use lex_corruption::config::CorruptionPlan;
///
/// let plan = CorruptionPlan::builder()
///     .seed(42)
///     .categorical_drift("species", 50.0, "setosa")
///     .duplicates(5, 10.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorruptionPlan {
    /// Seed for the random generator. `None` draws a fresh seed from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Steps, applied in order.
    #[serde(default)]
    pub steps: Vec<CorruptionStep>,
}

impl CorruptionPlan {
    /// Create a new plan builder.
    pub fn builder() -> CorruptionPlanBuilder {
        CorruptionPlanBuilder::default()
    }

    /// Validate every step; the error names the first offending step.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (index, step) in self.steps.iter().enumerate() {
            step.validate(index + 1)?;
        }
        Ok(())
    }

    /// Parse and validate a plan from a JSON string.
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        let plan: CorruptionPlan = serde_json::from_str(json)?;
        plan.validate()
            .map_err(|e| crate::error::CorruptionError::InvalidPlan(e.to_string()))?;
        Ok(plan)
    }

    /// Read, parse and validate a plan from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Errors that can occur during plan validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Step {step}: percent {value} must be between 0 and 100")]
    InvalidPercent { step: usize, value: f64 },

    #[error("Step {step}: '{field}' must not be negative (got {value})")]
    NegativeValue {
        step: usize,
        field: String,
        value: f64,
    },

    #[error("Step {step}: '{field}' must be a finite number")]
    NotFinite { step: usize, field: String },

    #[error("Step {step}: column name must not be empty")]
    EmptyColumn { step: usize },
}

/// Builder for [`CorruptionPlan`] with fluent API.
#[derive(Debug, Default)]
pub struct CorruptionPlanBuilder {
    seed: Option<u64>,
    steps: Vec<CorruptionStep>,
}

impl CorruptionPlanBuilder {
    /// Fix the random seed so the plan produces the same output every run.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Append an arbitrary step.
    pub fn step(mut self, step: CorruptionStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add absolute gaussian noise to a numeric column.
    pub fn numerical_drift(self, column: impl Into<String>, mean: f64, std: f64) -> Self {
        self.numerical_drift_scaled(column, mean, std, NoiseScaling::Absolute)
    }

    /// Add gaussian noise with an explicit [`NoiseScaling`].
    pub fn numerical_drift_scaled(
        self,
        column: impl Into<String>,
        mean: f64,
        std: f64,
        scaling: NoiseScaling,
    ) -> Self {
        self.step(CorruptionStep::NumericalDrift {
            column: column.into(),
            mean,
            std,
            scaling,
        })
    }

    /// Move the share of `category` to `percent`.
    pub fn categorical_drift(
        self,
        column: impl Into<String>,
        percent: f64,
        category: impl Into<String>,
    ) -> Self {
        self.step(CorruptionStep::CategoricalDrift {
            column: column.into(),
            percent,
            category: category.into(),
        })
    }

    /// Overwrite `percent` of the rows with duplicates.
    pub fn duplicates(self, rows_to_duplicate: usize, percent: f64) -> Self {
        self.duplicates_with_mode(rows_to_duplicate, percent, DuplicateMode::Replace)
    }

    /// Insert duplicates with an explicit [`DuplicateMode`].
    pub fn duplicates_with_mode(
        self,
        rows_to_duplicate: usize,
        percent: f64,
        mode: DuplicateMode,
    ) -> Self {
        self.step(CorruptionStep::Duplicates {
            rows_to_duplicate,
            percent,
            mode,
        })
    }

    /// Leak the label into `column`.
    pub fn label_correlation(self, column: impl Into<String>, power: f64) -> Self {
        self.step(CorruptionStep::LabelCorrelation {
            column: column.into(),
            power,
        })
    }

    /// Insert string variants into `percent` of `column`.
    pub fn variants(
        self,
        column: impl Into<String>,
        percent: f64,
        strategy: VariantStrategy,
    ) -> Self {
        self.step(CorruptionStep::Variants {
            column: column.into(),
            percent,
            strategy,
        })
    }

    /// Build and validate the plan.
    pub fn build(self) -> Result<CorruptionPlan, ConfigValidationError> {
        let plan = CorruptionPlan {
            seed: self.seed,
            steps: self.steps,
        };
        plan.validate()?;
        Ok(plan)
    }
}
