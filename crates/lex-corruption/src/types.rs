use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// Record of one corruption step as applied by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedStep {
    /// 1-based position of the step in its plan.
    pub index: usize,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub description: String,
    /// Cells whose value differs after the step (appended rows count fully).
    pub changed_cells: usize,
}

/// Summary of a plan run, suitable for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorruptionReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Seed the engine was created with, if any
    pub seed: Option<u64>,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns: usize,
    pub steps: Vec<AppliedStep>,
}

impl CorruptionReport {
    /// Total changed cells over all steps.
    pub fn total_changed_cells(&self) -> usize {
        self.steps.iter().map(|s| s.changed_cells).sum()
    }
}

/// Corrupted dataset plus the report describing how it was produced.
#[derive(Debug, Clone)]
pub struct CorruptionOutcome {
    pub dataset: Dataset,
    pub report: CorruptionReport,
}
