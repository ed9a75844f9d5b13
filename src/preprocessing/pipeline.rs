//! Record table to feature matrix

use crate::error::{PipelineError, Result};
use super::config::EncoderConfig;
use super::encoder::{column_numbers, column_strings, OneHotEncoder, OrdinalEncoder};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

/// Encoded features and labels, row-aligned with the source table
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDataset {
    pub features: Array2<f64>,
    /// Class codes indexing into `class_names`
    pub labels: Array1<f64>,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
}

impl EncodedDataset {
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of rows per class, in `class_names` order
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.class_names.len()];
        for &code in self.labels.iter() {
            counts[code as usize] += 1;
        }
        counts
    }
}

/// Fits the column encoders on a record table and produces `EncodedDataset`s
///
/// Columns other than the target and the one-hot columns keep their original
/// order; ordinal columns are coded in place and everything else must be
/// numeric. Indicator columns are appended at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseEncoder {
    config: EncoderConfig,
    ordinal: OrdinalEncoder,
    onehot: OneHotEncoder,
    passthrough_columns: Vec<String>,
    class_names: Vec<String>,
    is_fitted: bool,
}

impl Default for CaseEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseEncoder {
    /// Create an encoder with the default column layout
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    /// Create an encoder with a custom configuration
    pub fn with_config(config: EncoderConfig) -> Self {
        let mut ordinal = OrdinalEncoder::new(config.missing_sentinel.clone())
            .with_handle_unknown(config.handle_unknown);
        let mut onehot = OneHotEncoder::new(config.missing_sentinel.clone())
            .with_handle_unknown(config.handle_unknown);

        for (column, categories) in &config.categories {
            if config.ordinal_columns.contains(column) {
                ordinal = ordinal.with_categories(column.clone(), categories.clone());
            }
            if config.onehot_columns.contains(column) {
                onehot = onehot.with_categories(column.clone(), categories.clone());
            }
        }

        Self {
            config,
            ordinal,
            onehot,
            passthrough_columns: Vec::new(),
            class_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit vocabularies and the class list
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();
        let target = self.config.target_column.as_str();

        if df.column(target).is_err() {
            return Err(PipelineError::FeatureNotFound(target.to_string()));
        }

        let outcomes = self.target_values(df)?;
        self.class_names = outcomes
            .into_iter()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        self.passthrough_columns = df
            .get_columns()
            .iter()
            .map(|col| col.name().to_string())
            .filter(|name| name != target && !self.config.onehot_columns.contains(name))
            .collect();

        let ordinal_columns: Vec<&str> = self.config.ordinal_columns.iter().map(String::as_str).collect();
        let onehot_columns: Vec<&str> = self.config.onehot_columns.iter().map(String::as_str).collect();
        self.ordinal.fit(df, &ordinal_columns)?;
        self.onehot.fit(df, &onehot_columns)?;

        self.is_fitted = true;

        info!(
            classes = self.class_names.len(),
            features = self.n_output_features(),
            "fitted case encoder"
        );
        debug!(
            passthrough = ?self.passthrough_columns,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "encoder layout"
        );

        Ok(self)
    }

    /// Encode feature columns only; the target column need not be present
    pub fn transform_features(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(self.n_output_features());

        for name in &self.passthrough_columns {
            let values = if self.config.ordinal_columns.contains(name) {
                self.ordinal.transform_column(df, name)?
            } else {
                column_numbers(df, name)?
            };
            columns.push(values);
        }
        columns.extend(self.onehot.transform(df)?);

        Ok(Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| columns[j][i]))
    }

    /// Encode `df` with the fitted vocabularies
    pub fn transform(&self, df: &DataFrame) -> Result<EncodedDataset> {
        let features = self.transform_features(df)?;

        let labels = self
            .target_values(df)?
            .iter()
            .map(|outcome| {
                self.class_names
                    .binary_search(outcome)
                    .map(|code| code as f64)
                    .map_err(|_| {
                        PipelineError::DataError(format!("unknown outcome '{}'", outcome))
                    })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(EncodedDataset {
            features,
            labels: Array1::from_vec(labels),
            feature_names: self.feature_names(),
            class_names: self.class_names.clone(),
        })
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<EncodedDataset> {
        self.fit(df)?;
        self.transform(df)
    }

    fn target_values(&self, df: &DataFrame) -> Result<Vec<String>> {
        let target = self.config.target_column.as_str();
        let column = df
            .column(target)
            .map_err(|_| PipelineError::FeatureNotFound(target.to_string()))?;
        let missing = column.as_materialized_series().null_count();
        if missing > 0 {
            return Err(PipelineError::DataError(format!(
                "target column '{}' has {} missing values",
                target, missing
            )));
        }
        column_strings(df, target, &self.config.missing_sentinel)
    }

    /// Output column names, in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.passthrough_columns.clone();
        names.extend(self.onehot.feature_names());
        names
    }

    pub fn n_output_features(&self) -> usize {
        self.passthrough_columns.len() + self.onehot.n_output_features()
    }

    /// Distinct outcome strings; label codes index into this list
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn ordinal(&self) -> &OrdinalEncoder {
        &self.ordinal
    }

    pub fn onehot(&self) -> &OneHotEncoder {
        &self.onehot
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
