//! Tabular dataset with label and categorical-feature metadata.

use crate::error::{CorruptionError, Result};
use crate::utils::{DtypeCategory, column_series, get_dtype_category, is_integer_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Integer labels with at most this many distinct values are treated as
/// class indices.
const MAX_CLASSIFICATION_CLASSES: usize = 10;

/// Kind of prediction target a label column represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Classification,
    Regression,
}

/// A DataFrame plus the metadata corruption steps need: which column is the
/// label and which features are categorical.
///
/// Datasets are immutable; [`Dataset::with_data`] returns a new dataset over
/// corrupted data with the same metadata.
#[derive(Debug, Clone)]
pub struct Dataset {
    data: DataFrame,
    label: Option<String>,
    cat_features: Vec<String>,
}

impl Dataset {
    /// Wrap a DataFrame with no label. Categorical features are inferred
    /// from string, categorical and boolean columns.
    pub fn new(data: DataFrame) -> Self {
        let cat_features = infer_cat_features(&data);
        Self {
            data,
            label: None,
            cat_features,
        }
    }

    /// Mark `label` as the label column. The label is removed from the
    /// categorical features.
    pub fn with_label(mut self, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if self.data.column(&label).is_err() {
            return Err(CorruptionError::ColumnNotFound(label));
        }
        self.cat_features.retain(|c| c != &label);
        self.label = Some(label);
        Ok(self)
    }

    /// Declare the categorical features explicitly instead of inferring them.
    pub fn with_cat_features<S: Into<String>>(
        mut self,
        cat_features: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let cat_features: Vec<String> = cat_features.into_iter().map(Into::into).collect();
        if let Some(missing) = cat_features
            .iter()
            .find(|c| self.data.column(c.as_str()).is_err())
        {
            return Err(CorruptionError::ColumnNotFound(missing.clone()));
        }
        self.cat_features = cat_features;
        Ok(self)
    }

    /// Copy of this dataset over `data`, keeping label and categorical
    /// features. Fails if `data` lacks one of those columns.
    pub fn with_data(&self, data: DataFrame) -> Result<Self> {
        let dataset = Self {
            data,
            label: None,
            cat_features: Vec::new(),
        };
        let dataset = dataset.with_cat_features(self.cat_features.iter().cloned())?;
        match &self.label {
            Some(label) => dataset.with_label(label.clone()),
            None => Ok(dataset),
        }
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn into_data(self) -> DataFrame {
        self.data
    }

    pub fn label_name(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn cat_features(&self) -> &[String] {
        &self.cat_features
    }

    pub fn n_samples(&self) -> usize {
        self.data.height()
    }

    /// All columns except the label.
    pub fn features(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| Some(name.as_str()) != self.label.as_deref())
            .collect()
    }

    /// Features with a numeric dtype that are not declared categorical.
    pub fn numerical_features(&self) -> Vec<String> {
        self.features()
            .into_iter()
            .filter(|name| !self.cat_features.contains(name))
            .filter(|name| {
                self.data.column(name).is_ok_and(|c| {
                    get_dtype_category(c.dtype()) == DtypeCategory::Numeric
                })
            })
            .collect()
    }

    /// The label column as a Series.
    pub fn label_series(&self) -> Result<Series> {
        let label = self.label.as_deref().ok_or_else(|| {
            CorruptionError::invalid_parameter("label", "dataset has no label column")
        })?;
        column_series(&self.data, label)
    }

    /// Whether the label looks like a class index or a regression target.
    ///
    /// String, categorical and boolean labels are classification labels, as
    /// are integer labels with at most ten distinct values. Everything else
    /// is a regression target.
    pub fn label_kind(&self) -> Result<Option<LabelKind>> {
        if self.label.is_none() {
            return Ok(None);
        }
        let label = self.label_series()?;
        let kind = match get_dtype_category(label.dtype()) {
            DtypeCategory::String | DtypeCategory::Boolean => LabelKind::Classification,
            DtypeCategory::Numeric
                if is_integer_dtype(label.dtype())
                    && label.n_unique()? <= MAX_CLASSIFICATION_CLASSES =>
            {
                LabelKind::Classification
            }
            _ => LabelKind::Regression,
        };
        Ok(Some(kind))
    }
}

/// String, categorical and boolean columns.
pub fn infer_cat_features(data: &DataFrame) -> Vec<String> {
    data.get_columns()
        .iter()
        .filter(|c| {
            matches!(
                get_dtype_category(c.dtype()),
                DtypeCategory::String | DtypeCategory::Boolean
            )
        })
        .map(|c| c.name().to_string())
        .collect()
}
