//! Encoding configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::UnknownCategory;

/// Configuration for turning the record table into a feature matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Supervised target column
    pub target_column: String,

    /// Columns replaced in place by an integer code
    pub ordinal_columns: Vec<String>,

    /// Columns expanded into one indicator column per category
    pub onehot_columns: Vec<String>,

    /// Text used for missing categorical values before encoding
    pub missing_sentinel: String,

    /// What to do with categories not seen during fit
    pub handle_unknown: UnknownCategory,

    /// Fixed vocabularies; columns listed here skip derivation from the data
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            target_column: "outcome".to_string(),
            ordinal_columns: vec!["date_confirmation".to_string()],
            onehot_columns: vec![
                "sex".to_string(),
                "country".to_string(),
                "province".to_string(),
            ],
            missing_sentinel: "nan".to_string(),
            handle_unknown: UnknownCategory::Error,
            categories: BTreeMap::new(),
        }
    }
}

impl EncoderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the target column
    pub fn with_target(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    /// Builder method to set the ordinal columns
    pub fn with_ordinal_columns(mut self, columns: &[&str]) -> Self {
        self.ordinal_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Builder method to set the one-hot columns
    pub fn with_onehot_columns(mut self, columns: &[&str]) -> Self {
        self.onehot_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Builder method to set unknown-category handling
    pub fn with_handle_unknown(mut self, handle_unknown: UnknownCategory) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Builder method to fix the vocabulary of a categorical column
    pub fn with_categories(mut self, column: impl Into<String>, categories: &[&str]) -> Self {
        self.categories.insert(
            column.into(),
            categories.iter().map(|c| c.to_string()).collect(),
        );
        self
    }
}
