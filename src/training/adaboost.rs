//! AdaBoost (Adaptive Boosting) implementation
//!
//! AdaBoost builds an ensemble of depth-1 decision trees, weighting
//! misclassified samples more heavily in subsequent rounds. Two multi-class
//! variants are supported:
//! - `SAMME` votes with each stump's hard prediction, weighted by its alpha
//! - `SAMME.R` sums the centred log-probabilities of every stump

use crate::error::{PipelineError, Result};
use crate::utils::{argmax, unique_classes};
use super::decision_tree::DecisionTree;
use super::params::HyperParams;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Probabilities are clipped to this before taking logs
const PROBA_EPS: f64 = f64::EPSILON;

/// Boosting variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BoostAlgorithm {
    /// Discrete boosting on hard predictions
    #[serde(rename = "SAMME")]
    Samme,
    /// Real boosting on class probabilities
    #[serde(rename = "SAMME.R")]
    SammeR,
}

impl fmt::Display for BoostAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoostAlgorithm::Samme => write!(f, "SAMME"),
            BoostAlgorithm::SammeR => write!(f, "SAMME.R"),
        }
    }
}

impl std::str::FromStr for BoostAlgorithm {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SAMME" => Ok(BoostAlgorithm::Samme),
            "SAMME.R" => Ok(BoostAlgorithm::SammeR),
            other => Err(PipelineError::InvalidParameter {
                name: "algorithm".to_string(),
                value: other.to_string(),
                reason: "expected SAMME or SAMME.R".to_string(),
            }),
        }
    }
}

/// AdaBoost classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostClassifier {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub algorithm: BoostAlgorithm,
    pub random_state: Option<u64>,
    estimators: Vec<DecisionTree>,
    estimator_weights: Vec<f64>,
    estimator_errors: Vec<f64>,
    classes: Vec<f64>,
    n_features: usize,
}

impl Default for AdaBoostClassifier {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostClassifier {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            algorithm: BoostAlgorithm::SammeR,
            random_state: None,
            estimators: Vec::new(),
            estimator_weights: Vec::new(),
            estimator_errors: Vec::new(),
            classes: Vec::new(),
            n_features: 0,
        }
    }

    /// Build from named hyperparameters
    pub fn from_params(params: &HyperParams) -> Result<Self> {
        params.check_known(
            &["n_estimators", "learning_rate", "algorithm", "random_state"],
            "AdaBoost",
        )?;

        let mut model = Self::default();
        if let Some(n) = params.usize("n_estimators")? {
            model.n_estimators = n;
        }
        if let Some(lr) = params.f64("learning_rate")? {
            model.learning_rate = lr;
        }
        if let Some(algorithm) = params.text("algorithm")? {
            model.algorithm = algorithm.parse()?;
        }
        if let Some(seed) = params.usize("random_state")? {
            model.random_state = Some(seed as u64);
        }
        Ok(model)
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_algorithm(mut self, algorithm: BoostAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.learning_rate > 0.0) {
            return Err(PipelineError::InvalidParameter {
                name: "learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        self.validate()?;

        self.classes = unique_classes(y);
        if self.classes.len() < 2 {
            return Err(PipelineError::TrainingError(format!(
                "AdaBoost needs at least 2 classes, got {}",
                self.classes.len()
            )));
        }
        self.n_features = x.ncols();

        self.estimators.clear();
        self.estimator_weights.clear();
        self.estimator_errors.clear();

        let y_idx: Vec<usize> = y
            .iter()
            .map(|&v| self.classes.iter().position(|&c| c == v).unwrap_or(0))
            .collect();
        let mut weights = Array1::from_elem(n_samples, 1.0 / n_samples as f64);

        for round in 0..self.n_estimators {
            let seed = self.random_state.unwrap_or(42).wrapping_add(round as u64);
            let mut stump = DecisionTree::new().with_max_depth(1).with_random_state(seed);
            let round_weights = weights.to_vec();
            stump.fit_weighted(x, y, &self.classes, &round_weights)?;

            let stop = match self.algorithm {
                BoostAlgorithm::Samme => self.boost_discrete(stump, x, &y_idx, &mut weights)?,
                BoostAlgorithm::SammeR => self.boost_real(stump, x, &y_idx, &mut weights)?,
            };
            if stop {
                debug!(round, "boosting stopped early");
                break;
            }

            let total = weights.sum();
            if !(total > 0.0) {
                warn!(round, "sample weights collapsed; stopping");
                break;
            }
            weights /= total;
        }

        debug!(
            estimators = self.estimators.len(),
            algorithm = %self.algorithm,
            "fitted AdaBoost"
        );

        Ok(self)
    }

    /// One SAMME round; returns true when boosting should stop
    fn boost_discrete(
        &mut self,
        stump: DecisionTree,
        x: &Array2<f64>,
        y_idx: &[usize],
        weights: &mut Array1<f64>,
    ) -> Result<bool> {
        let n_classes = self.classes.len() as f64;
        let proba = stump.predict_proba(x)?;
        let incorrect: Vec<bool> = proba
            .outer_iter()
            .zip(y_idx)
            .map(|(row, &true_idx)| argmax(row) != true_idx)
            .collect();

        let error: f64 = incorrect
            .iter()
            .zip(weights.iter())
            .filter(|(&miss, _)| miss)
            .map(|(_, &w)| w)
            .sum::<f64>()
            / weights.sum();

        if error <= 0.0 {
            self.push(stump, 1.0, 0.0);
            return Ok(true);
        }

        if error >= 1.0 - 1.0 / n_classes {
            if self.estimators.is_empty() {
                return Err(PipelineError::TrainingError(format!(
                    "first weak learner has error {:.4}, no better than chance for {} classes",
                    error, n_classes
                )));
            }
            return Ok(true);
        }

        let alpha = self.learning_rate * (((1.0 - error) / error).ln() + (n_classes - 1.0).ln());

        for (w, &miss) in weights.iter_mut().zip(incorrect.iter()) {
            if miss && *w > 0.0 {
                *w *= alpha.exp();
            }
        }

        self.push(stump, alpha, error);
        Ok(false)
    }

    /// One SAMME.R round; returns true when boosting should stop
    fn boost_real(
        &mut self,
        stump: DecisionTree,
        x: &Array2<f64>,
        y_idx: &[usize],
        weights: &mut Array1<f64>,
    ) -> Result<bool> {
        let k = self.classes.len() as f64;
        let proba = stump.predict_proba(x)?.mapv(|p| p.max(PROBA_EPS));

        let mut error = 0.0;
        for ((row, &true_idx), &w) in proba.outer_iter().zip(y_idx).zip(weights.iter()) {
            if argmax(row) != true_idx {
                error += w;
            }
        }
        error /= weights.sum();

        // y coding: 1 for the true class, -1/(K-1) for the others
        let off = -1.0 / (k - 1.0);
        for ((row, &true_idx), w) in proba.outer_iter().zip(y_idx).zip(weights.iter_mut()) {
            let inner: f64 = row
                .iter()
                .enumerate()
                .map(|(j, &p)| if j == true_idx { p.ln() } else { off * p.ln() })
                .sum();
            let exponent = -self.learning_rate * (k - 1.0) / k * inner;
            if *w > 0.0 || exponent < 0.0 {
                *w *= exponent.exp();
            }
        }

        self.push(stump, 1.0, error);
        Ok(error <= 0.0)
    }

    fn push(&mut self, stump: DecisionTree, weight: f64, error: f64) {
        self.estimators.push(stump);
        self.estimator_weights.push(weight);
        self.estimator_errors.push(error);
    }

    /// Per-class ensemble scores, normalised by the total estimator weight
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.estimators.is_empty() {
            return Err(PipelineError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let n_classes = self.classes.len();
        let k = n_classes as f64;
        let mut scores = Array2::<f64>::zeros((x.nrows(), n_classes));

        for (stump, &alpha) in self.estimators.iter().zip(self.estimator_weights.iter()) {
            let proba = stump.predict_proba(x)?;
            match self.algorithm {
                BoostAlgorithm::Samme => {
                    for (i, row) in proba.outer_iter().enumerate() {
                        scores[[i, argmax(row)]] += alpha;
                    }
                }
                BoostAlgorithm::SammeR => {
                    let log_proba = proba.mapv(|p| p.max(PROBA_EPS).ln());
                    let mean = log_proba.sum_axis(Axis(1)) / k;
                    for (i, row) in log_proba.outer_iter().enumerate() {
                        for (j, &lp) in row.iter().enumerate() {
                            scores[[i, j]] += (k - 1.0) * (lp - mean[i]);
                        }
                    }
                }
            }
        }

        let total: f64 = self.estimator_weights.iter().sum();
        if total > 0.0 {
            scores /= total;
        }
        Ok(scores)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_function(x)?;
        Ok(scores
            .outer_iter()
            .map(|row| self.classes[argmax(row)])
            .collect())
    }

    /// Softmax of the decision scores scaled by 1/(K-1)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let k = self.classes.len() as f64;
        let mut scores = self.decision_function(x)? / (k - 1.0);

        for mut row in scores.outer_iter_mut() {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            row.mapv_inplace(|s| (s - max).exp());
            let sum = row.sum();
            row /= sum;
        }
        Ok(scores)
    }

    /// Estimator-weighted mean of the stumps' importances
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.estimators.is_empty() {
            return None;
        }
        let mut importances = Array1::<f64>::zeros(self.n_features);
        for (stump, &w) in self.estimators.iter().zip(self.estimator_weights.iter()) {
            if let Some(imp) = stump.feature_importances() {
                importances.scaled_add(w, imp);
            }
        }
        let total: f64 = importances.sum();
        if total > 0.0 {
            importances /= total;
        }
        Some(importances)
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn estimators(&self) -> &[DecisionTree] {
        &self.estimators
    }

    pub fn estimator_weights(&self) -> &[f64] {
        &self.estimator_weights
    }

    pub fn estimator_errors(&self) -> &[f64] {
        &self.estimator_errors
    }

    pub fn is_fitted(&self) -> bool {
        !self.estimators.is_empty()
    }
}
