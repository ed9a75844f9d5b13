//! Model implementations and traits

use crate::error::{PipelineError, Result};
use super::adaboost::AdaBoostClassifier;
use super::decision_tree::DecisionTree;
use super::params::HyperParams;
use super::random_forest::RandomForest;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for classifiers
pub trait Classifier: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Class probabilities, one column per entry of `classes()`
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Sorted class labels seen during fit
    fn classes(&self) -> &[f64];

    /// Get feature importances (if available)
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }

    /// Mean accuracy on the given data
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        crate::evaluation::accuracy_score(y, &predictions)
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        DecisionTree::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        DecisionTree::predict(self, x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        DecisionTree::predict_proba(self, x)
    }

    fn classes(&self) -> &[f64] {
        DecisionTree::classes(self)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        DecisionTree::feature_importances(self).cloned()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        RandomForest::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RandomForest::predict(self, x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        RandomForest::predict_proba(self, x)
    }

    fn classes(&self) -> &[f64] {
        RandomForest::classes(self)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        RandomForest::feature_importances(self).cloned()
    }
}

impl Classifier for AdaBoostClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        AdaBoostClassifier::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        AdaBoostClassifier::predict(self, x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        AdaBoostClassifier::predict_proba(self, x)
    }

    fn classes(&self) -> &[f64] {
        AdaBoostClassifier::classes(self)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        AdaBoostClassifier::feature_importances(self)
    }
}

/// Supported model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    DecisionTree,
    RandomForest,
    #[serde(rename = "adaboost")]
    AdaBoost,
}

impl ModelKind {
    /// Stable identifier, also used for model file names
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::AdaBoost => "adaboost",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::AdaBoost => "AdaBoost",
        };
        write!(f, "{}", name)
    }
}

/// A model family plus its hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub kind: ModelKind,
    #[serde(default)]
    pub params: HyperParams,
}

impl ModelSpec {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            params: HyperParams::new(),
        }
    }

    pub fn with_params(mut self, params: HyperParams) -> Self {
        self.params = params;
        self
    }

    /// Same family with `overrides` layered on top of the current parameters
    pub fn with_overrides(&self, overrides: &HyperParams) -> Self {
        Self {
            kind: self.kind,
            params: self.params.merged(overrides),
        }
    }

    /// Construct an unfitted model
    pub fn build(&self) -> Result<TrainedModel> {
        Ok(match self.kind {
            ModelKind::DecisionTree => TrainedModel::DecisionTree(DecisionTree::from_params(&self.params)?),
            ModelKind::RandomForest => TrainedModel::RandomForest(RandomForest::from_params(&self.params)?),
            ModelKind::AdaBoost => TrainedModel::AdaBoost(AdaBoostClassifier::from_params(&self.params)?),
        })
    }
}

/// Enum to hold model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    AdaBoost(AdaBoostClassifier),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::DecisionTree(_) => ModelKind::DecisionTree,
            TrainedModel::RandomForest(_) => ModelKind::RandomForest,
            TrainedModel::AdaBoost(_) => ModelKind::AdaBoost,
        }
    }

    pub fn is_fitted(&self) -> bool {
        match self {
            TrainedModel::DecisionTree(m) => m.is_fitted(),
            TrainedModel::RandomForest(m) => m.is_fitted(),
            TrainedModel::AdaBoost(m) => m.is_fitted(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::DecisionTree(m) => m,
            TrainedModel::RandomForest(m) => m,
            TrainedModel::AdaBoost(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            TrainedModel::DecisionTree(m) => m,
            TrainedModel::RandomForest(m) => m,
            TrainedModel::AdaBoost(m) => m,
        }
    }
}

impl Classifier for TrainedModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner().predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.inner().predict_proba(x)
    }

    fn classes(&self) -> &[f64] {
        self.inner().classes()
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.inner().feature_importances()
    }
}

impl TryFrom<&ModelSpec> for TrainedModel {
    type Error = PipelineError;

    fn try_from(spec: &ModelSpec) -> Result<Self> {
        spec.build()
    }
}
