//! Error types for corruption injection.
//!
//! Every corruption function validates its inputs up front and reports
//! failures through [`CorruptionError`]. Degenerate inputs (a constant
//! column, an empty variant set) are not errors: they are logged and the
//! input is returned unchanged.
//!
//! Errors are serializable so that a front-end can show them directly.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for corruption injection.
#[derive(Error, Debug)]
pub enum CorruptionError {
    /// The number of rows to pick exceeds the rows available to pick from.
    #[error(
        "{operation}: cannot sample {requested} rows from a population of {available}"
    )]
    Sampling {
        operation: String,
        requested: usize,
        available: usize,
    },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A corruption parameter is outside its accepted range.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// The column has a data type the corruption cannot work with.
    #[error("Column '{column}' has type {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// A corruption plan failed validation.
    #[error("Invalid corruption plan: {0}")]
    InvalidPlan(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CorruptionError>,
    },
}

impl CorruptionError {
    /// Build a [`CorruptionError::Sampling`] error.
    pub fn sampling(operation: impl Into<String>, requested: usize, available: usize) -> Self {
        CorruptionError::Sampling {
            operation: operation.into(),
            requested,
            available,
        }
    }

    /// Build a [`CorruptionError::InvalidParameter`] error.
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        CorruptionError::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CorruptionError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Sampling { .. } => "SAMPLING_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidPlan(_) => "INVALID_PLAN",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is an insufficient-population sampling failure.
    pub fn is_sampling_error(&self) -> bool {
        match self {
            Self::Sampling { .. } => true,
            Self::WithContext { source, .. } => source.is_sampling_error(),
            _ => false,
        }
    }

    /// Check if the caller can recover by adjusting the parameters
    /// (clamping a percentage, picking another column) and retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Sampling { .. }
            | Self::InvalidParameter { .. }
            | Self::ColumnNotFound(_)
            | Self::TypeMismatch { .. } => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CorruptionError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CorruptionError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for corruption operations.
pub type Result<T> = std::result::Result<T, CorruptionError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CorruptionError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CorruptionError::sampling("duplicates", 5, 3).error_code(),
            "SAMPLING_ERROR"
        );
        assert_eq!(
            CorruptionError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_sampling_message_names_sizes() {
        let error = CorruptionError::sampling("categorical drift", 7, 2);
        let message = error.to_string();
        assert!(message.contains("categorical drift"));
        assert!(message.contains('7'));
        assert!(message.contains('2'));
    }

    #[test]
    fn test_is_sampling_error_through_context() {
        let error = CorruptionError::sampling("duplicates", 5, 3).with_context("Step 2");
        assert!(error.is_sampling_error());
        assert!(error.is_recoverable());
        assert!(!CorruptionError::InvalidPlan("empty".to_string()).is_sampling_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(CorruptionError::invalid_parameter("percent", "above 100").is_recoverable());
        assert!(!CorruptionError::InvalidPlan("no steps".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = CorruptionError::ColumnNotFound("sepal length".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("sepal length"));
    }

    #[test]
    fn test_with_context() {
        let error = CorruptionError::ColumnNotFound("x".to_string()).with_context("Step 1");
        assert!(error.to_string().contains("Step 1"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_polars_result_context() {
        let df = polars::prelude::DataFrame::empty();
        let error = df
            .column("missing")
            .map(|_| ())
            .context("Reading input")
            .unwrap_err();
        assert_eq!(error.error_code(), "POLARS_ERROR");
        assert!(error.to_string().starts_with("Reading input"));
    }
}
