//! Hyperparameter values and grids

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Named hyperparameters for one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperParams(BTreeMap<String, ParamValue>);

impl HyperParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `other` wins on conflicts
    pub fn merged(&self, other: &HyperParams) -> HyperParams {
        let mut out = self.clone();
        for (k, v) in other.iter() {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    /// Reject names a model does not understand
    pub fn check_known(&self, known: &[&str], model: &str) -> Result<()> {
        for name in self.0.keys() {
            if !known.contains(&name.as_str()) {
                return Err(PipelineError::InvalidParameter {
                    name: name.clone(),
                    value: self.0[name].to_string(),
                    reason: format!("not a parameter of {}", model),
                });
            }
        }
        Ok(())
    }

    pub fn usize(&self, name: &str) -> Result<Option<usize>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Int(v)) if *v >= 0 => Ok(Some(*v as usize)),
            Some(other) => Err(invalid(name, other, "expected a non-negative integer")),
        }
    }

    /// Integer, or unlimited when given as `"None"`
    pub fn optional_usize(&self, name: &str) -> Result<Option<Option<usize>>> {
        match self.0.get(name) {
            Some(ParamValue::Text(s)) if s.eq_ignore_ascii_case("none") => Ok(Some(None)),
            _ => Ok(self.usize(name)?.map(Some)),
        }
    }

    pub fn f64(&self, name: &str) -> Result<Option<f64>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Float(v)) => Ok(Some(*v)),
            Some(ParamValue::Int(v)) => Ok(Some(*v as f64)),
            Some(other) => Err(invalid(name, other, "expected a number")),
        }
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Bool(v)) => Ok(Some(*v)),
            Some(other) => Err(invalid(name, other, "expected true or false")),
        }
    }

    pub fn text(&self, name: &str) -> Result<Option<&str>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Text(v)) => Ok(Some(v.as_str())),
            Some(other) => Err(invalid(name, other, "expected a string")),
        }
    }

    /// Compact `{name: value, ...}` rendering for logs and reports
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        format!("{{{}}}", parts.join(", "))
    }
}

fn invalid(name: &str, value: &ParamValue, reason: &str) -> PipelineError {
    PipelineError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Candidate values per hyperparameter; searched as a Cartesian product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamGrid(BTreeMap<String, Vec<ParamValue>>);

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.0.insert(name.into(), values);
        self
    }

    pub fn param_names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        if self.0.is_empty() {
            return 0;
        }
        self.0.values().map(Vec::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All combinations; the last parameter name (sorted) varies fastest
    pub fn combinations(&self) -> Vec<HyperParams> {
        let mut combos = vec![HyperParams::new()];
        for (name, values) in &self.0 {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut extended = combo.clone();
                    extended.insert(name.clone(), value.clone());
                    next.push(extended);
                }
            }
            combos = next;
        }
        if self.0.is_empty() {
            return Vec::new();
        }
        combos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adaboost_grid() -> ParamGrid {
        ParamGrid::new()
            .with("n_estimators", vec![10i64.into()])
            .with("learning_rate", vec![1i64.into(), 0.5.into(), 0.1.into()])
            .with("algorithm", vec!["SAMME".into(), "SAMME.R".into()])
    }

    #[test]
    fn test_grid_size() {
        let grid = adaboost_grid();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.combinations().len(), 6);
    }

    #[test]
    fn test_combination_order() {
        let combos = adaboost_grid().combinations();
        // keys sorted: algorithm, learning_rate, n_estimators
        assert_eq!(combos[0].text("algorithm").unwrap(), Some("SAMME"));
        assert_eq!(combos[0].f64("learning_rate").unwrap(), Some(1.0));
        assert_eq!(combos[1].f64("learning_rate").unwrap(), Some(0.5));
        assert_eq!(combos[3].text("algorithm").unwrap(), Some("SAMME.R"));
    }

    #[test]
    fn test_grid_from_json() {
        let grid: ParamGrid = serde_json::from_str(
            r#"{"n_estimators": [10], "learning_rate": [1, 0.5], "algorithm": ["SAMME"]}"#,
        )
        .unwrap();
        assert_eq!(grid.len(), 2);
        let combos = grid.combinations();
        assert_eq!(combos[0].get("learning_rate"), Some(&ParamValue::Int(1)));
        assert_eq!(combos[0].f64("learning_rate").unwrap(), Some(1.0));
    }

    #[test]
    fn test_typed_accessors() {
        let params = HyperParams::new()
            .with("max_depth", "None")
            .with("min_samples_leaf", 2i64)
            .with("bootstrap", false);

        assert_eq!(params.optional_usize("max_depth").unwrap(), Some(None));
        assert_eq!(params.usize("min_samples_leaf").unwrap(), Some(2));
        assert_eq!(params.bool("bootstrap").unwrap(), Some(false));
        assert!(params.usize("bootstrap").is_err());
        assert_eq!(params.usize("absent").unwrap(), None);
    }

    #[test]
    fn test_check_known() {
        let params = HyperParams::new().with("max_depth", 3i64);
        assert!(params.check_known(&["max_depth"], "DecisionTree").is_ok());
        assert!(params.check_known(&["n_estimators"], "AdaBoost").is_err());
    }

    #[test]
    fn test_merged_prefers_other() {
        let base = HyperParams::new().with("n_estimators", 10i64).with("random_state", 0i64);
        let merged = base.merged(&HyperParams::new().with("n_estimators", 20i64));
        assert_eq!(merged.usize("n_estimators").unwrap(), Some(20));
        assert_eq!(merged.usize("random_state").unwrap(), Some(0));
    }

    #[test]
    fn test_describe() {
        let params = HyperParams::new().with("learning_rate", 0.5).with("algorithm", "SAMME");
        assert_eq!(params.describe(), "{algorithm: SAMME, learning_rate: 0.5}");
    }
}
