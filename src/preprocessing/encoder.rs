//! Categorical encoding implementations

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Handling of categories that were not seen during fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategory {
    /// Fail the transform
    Error,
    /// Encode as "no category": all-zero indicators, ordinal code -1
    Ignore,
}

impl Default for UnknownCategory {
    fn default() -> Self {
        UnknownCategory::Error
    }
}

/// Read a column as text, replacing nulls with `sentinel`
pub(crate) fn column_strings(df: &DataFrame, name: &str, sentinel: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;

    let series = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| {
            PipelineError::DataError(format!("column '{}' cannot be read as text: {}", name, e))
        })?;

    let ca = series
        .str()
        .map_err(|e| PipelineError::DataError(e.to_string()))?;

    Ok(ca
        .into_iter()
        .map(|v| v.unwrap_or(sentinel).to_string())
        .collect())
}

/// Read a column as `f64`; nulls and unparseable values are rejected
pub(crate) fn column_numbers(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;

    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| {
            PipelineError::DataError(format!("column '{}' is not numeric: {}", name, e))
        })?;

    let ca = series
        .f64()
        .map_err(|e| PipelineError::DataError(e.to_string()))?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                PipelineError::DataError(format!(
                    "column '{}' has a missing or non-numeric value at row {}",
                    name, row
                ))
            })
        })
        .collect()
}

fn sorted_vocabulary(values: &[String]) -> Vec<String> {
    values
        .iter()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn dedup_in_order(values: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

fn index_of(vocabulary: &[String]) -> HashMap<&str, usize> {
    vocabulary
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect()
}

/// Maps each distinct string of a column to an integer code
///
/// Codes follow the sorted order of the vocabulary, so the same set of
/// values always produces the same codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    sentinel: String,
    handle_unknown: UnknownCategory,
    fixed: BTreeMap<String, Vec<String>>,
    vocabularies: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OrdinalEncoder {
    /// Create a new encoder; `sentinel` stands in for missing values
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            handle_unknown: UnknownCategory::Error,
            fixed: BTreeMap::new(),
            vocabularies: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn with_handle_unknown(mut self, handle_unknown: UnknownCategory) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Use `categories` as the vocabulary of `column` instead of deriving it
    pub fn with_categories(mut self, column: impl Into<String>, categories: Vec<String>) -> Self {
        self.fixed.insert(column.into(), categories);
        self
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.vocabularies.clear();
        for &col_name in columns {
            let vocabulary = match self.fixed.get(col_name) {
                Some(fixed) => dedup_in_order(fixed),
                None => sorted_vocabulary(&column_strings(df, col_name, &self.sentinel)?),
            };
            tracing::debug!(column = col_name, categories = vocabulary.len(), "ordinal vocabulary");
            self.vocabularies.push((col_name.to_string(), vocabulary));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode one fitted column of `df`
    pub fn transform_column(&self, df: &DataFrame, column: &str) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let vocabulary = self
            .categories(column)
            .ok_or_else(|| PipelineError::FeatureNotFound(column.to_string()))?;
        let index = index_of(vocabulary);

        column_strings(df, column, &self.sentinel)?
            .iter()
            .map(|value| match (index.get(value.as_str()), self.handle_unknown) {
                (Some(&code), _) => Ok(code as f64),
                (None, UnknownCategory::Ignore) => Ok(-1.0),
                (None, UnknownCategory::Error) => Err(PipelineError::DataError(format!(
                    "unknown category '{}' in column '{}'",
                    value, column
                ))),
            })
            .collect()
    }

    /// Fitted vocabulary of a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.vocabularies
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v.as_slice())
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

/// Expands categorical columns into indicator columns
///
/// Output columns are named `<source>_<category>` so categories shared by
/// different source columns never collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    sentinel: String,
    handle_unknown: UnknownCategory,
    fixed: BTreeMap<String, Vec<String>>,
    vocabularies: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder; `sentinel` stands in for missing values
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            handle_unknown: UnknownCategory::Error,
            fixed: BTreeMap::new(),
            vocabularies: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn with_handle_unknown(mut self, handle_unknown: UnknownCategory) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Use `categories` as the vocabulary of `column` instead of deriving it
    pub fn with_categories(mut self, column: impl Into<String>, categories: Vec<String>) -> Self {
        self.fixed.insert(column.into(), categories);
        self
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.vocabularies.clear();
        for &col_name in columns {
            let vocabulary = match self.fixed.get(col_name) {
                Some(fixed) => dedup_in_order(fixed),
                None => sorted_vocabulary(&column_strings(df, col_name, &self.sentinel)?),
            };
            tracing::debug!(column = col_name, categories = vocabulary.len(), "one-hot vocabulary");
            self.vocabularies.push((col_name.to_string(), vocabulary));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Indicator columns for every fitted source column, in fit order
    pub fn transform(&self, df: &DataFrame) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut output = Vec::with_capacity(self.n_output_features());
        for (col_name, vocabulary) in &self.vocabularies {
            let values = column_strings(df, col_name, &self.sentinel)?;
            let index = index_of(vocabulary);
            let mut indicators = vec![vec![0.0; values.len()]; vocabulary.len()];

            for (row, value) in values.iter().enumerate() {
                match (index.get(value.as_str()), self.handle_unknown) {
                    (Some(&k), _) => indicators[k][row] = 1.0,
                    (None, UnknownCategory::Ignore) => {}
                    (None, UnknownCategory::Error) => {
                        return Err(PipelineError::DataError(format!(
                            "unknown category '{}' in column '{}'",
                            value, col_name
                        )));
                    }
                }
            }

            output.extend(indicators);
        }

        Ok(output)
    }

    /// Names of the generated indicator columns
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|(col_name, vocabulary)| {
                vocabulary
                    .iter()
                    .map(move |category| format!("{}_{}", col_name, category))
            })
            .collect()
    }

    /// Fitted vocabulary of a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.vocabularies
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v.as_slice())
    }

    pub fn n_output_features(&self) -> usize {
        self.vocabularies.iter().map(|(_, v)| v.len()).sum()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
