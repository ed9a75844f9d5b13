//! Random Forest implementation

use crate::error::{PipelineError, Result};
use crate::utils::{argmax, unique_classes};
use super::decision_tree::{Criterion, DecisionTree, MaxFeatures};
use super::params::HyperParams;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (sqrt by default)
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Out-of-bag score
    pub oob_score: bool,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Random state
    pub random_state: Option<u64>,
    /// Computed OOB score
    oob_score_value: Option<f64>,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Classes seen during fit
    classes: Vec<f64>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            oob_score: false,
            criterion: Criterion::Gini,
            random_state: None,
            oob_score_value: None,
            feature_importances: None,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Build from named hyperparameters
    pub fn from_params(params: &HyperParams) -> Result<Self> {
        params.check_known(
            &[
                "n_estimators",
                "max_depth",
                "min_samples_split",
                "min_samples_leaf",
                "max_features",
                "bootstrap",
                "oob_score",
                "criterion",
                "random_state",
            ],
            "RandomForest",
        )?;

        // Tree-level settings go through the tree's own parser
        let mut tree_params = HyperParams::new();
        for name in ["max_depth", "min_samples_split", "min_samples_leaf", "max_features", "criterion"] {
            if let Some(value) = params.get(name) {
                tree_params.insert(name, value.clone());
            }
        }
        let template = DecisionTree::from_params(&tree_params)?;

        let mut forest = Self::new(params.usize("n_estimators")?.unwrap_or(100));
        forest.max_depth = template.max_depth;
        forest.min_samples_split = template.min_samples_split;
        forest.min_samples_leaf = template.min_samples_leaf;
        forest.criterion = template.criterion;
        if params.get("max_features").is_some() {
            forest.max_features = template.max_features;
        }
        if let Some(bootstrap) = params.bool("bootstrap")? {
            forest.bootstrap = bootstrap;
        }
        if let Some(oob) = params.bool("oob_score")? {
            forest.oob_score = oob;
        }
        if let Some(seed) = params.usize("random_state")? {
            forest.random_state = Some(seed as u64);
        }
        Ok(forest)
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Enable OOB score computation
    pub fn with_oob_score(mut self, oob_score: bool) -> Self {
        self.oob_score = oob_score;
        self
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::ValidationError("cannot fit on zero samples".to_string()));
        }
        if self.n_estimators == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.oob_score && !self.bootstrap {
            return Err(PipelineError::InvalidParameter {
                name: "oob_score".to_string(),
                value: "true".to_string(),
                reason: "requires bootstrap sampling".to_string(),
            });
        }

        self.n_features = n_features;
        self.classes = unique_classes(y);
        let classes = self.classes.clone();

        // Build trees in parallel; tree i always gets seed base + i
        let base_seed = self.random_state.unwrap_or(42);
        let fitted: Vec<(DecisionTree, Vec<usize>)> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot = y.select(Axis(0), &sample_indices);
                let weights = vec![1.0; sample_indices.len()];

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_criterion(self.criterion)
                    .with_max_features(self.max_features)
                    .with_random_state(seed);
                tree.max_depth = self.max_depth;

                tree.fit_weighted(&x_boot, &y_boot, &classes, &weights)?;
                Ok((tree, sample_indices))
            })
            .collect::<Result<Vec<_>>>()?;

        let (trees, samples): (Vec<DecisionTree>, Vec<Vec<usize>>) = fitted.into_iter().unzip();
        self.trees = trees;

        self.compute_feature_importances();

        self.oob_score_value = if self.oob_score {
            Some(self.compute_oob_score(x, y, &samples)?)
        } else {
            None
        };

        debug!(
            trees = self.trees.len(),
            classes = self.classes.len(),
            "fitted random forest"
        );

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        let mut total_importances = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    total_importances[i] += val;
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut total_importances {
            *imp /= n_trees;
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Accuracy of each row's vote among trees that never saw it
    fn compute_oob_score(&self, x: &Array2<f64>, y: &Array1<f64>, samples: &[Vec<usize>]) -> Result<f64> {
        let n_samples = x.nrows();
        let mut votes = Array2::<f64>::zeros((n_samples, self.classes.len()));
        let mut seen = vec![false; n_samples];

        for (tree, drawn) in self.trees.iter().zip(samples) {
            let mut in_bag = vec![false; n_samples];
            for &i in drawn {
                in_bag[i] = true;
            }
            let oob: Vec<usize> = (0..n_samples).filter(|&i| !in_bag[i]).collect();
            if oob.is_empty() {
                continue;
            }
            let proba = tree.predict_proba(&x.select(Axis(0), &oob))?;
            for (row, &i) in oob.iter().enumerate() {
                let mut target = votes.row_mut(i);
                target += &proba.row(row);
                seen[i] = true;
            }
        }

        let mut correct = 0usize;
        let mut counted = 0usize;
        for i in (0..n_samples).filter(|&i| seen[i]) {
            counted += 1;
            if self.classes[argmax(votes.row(i))] == y[i] {
                correct += 1;
            }
        }

        if counted == 0 {
            return Err(PipelineError::TrainingError(
                "no out-of-bag samples; increase n_estimators".to_string(),
            ));
        }
        Ok(correct as f64 / counted as f64)
    }

    /// Mean of the trees' class probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let per_tree: Vec<Array2<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_proba(x))
            .collect::<Result<Vec<_>>>()?;

        let mut proba = Array2::zeros((x.nrows(), self.classes.len()));
        for p in &per_tree {
            proba += p;
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }

    /// Make predictions by soft voting
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .outer_iter()
            .map(|row| self.classes[argmax(row)])
            .collect())
    }

    /// Classes seen during fit
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get OOB score
    pub fn oob_score(&self) -> Option<f64> {
        self.oob_score_value
    }

    /// Fitted trees
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> (Array2<f64>, Array1<f64>) {
        let n = 60;
        let x = Array2::from_shape_fn((n, 3), |(i, j)| {
            let class = (i % 3) as f64;
            class * 10.0 + ((i * 7 + j * 13) % 5) as f64 * 0.3
        });
        let y = Array1::from_iter((0..n).map(|i| (i % 3) as f64));
        (x, y)
    }

    #[test]
    fn test_random_forest_classifier() {
        let (x, y) = blobs();
        let mut rf = RandomForest::new(10).with_random_state(0);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let accuracy = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 1e-10)
            .count() as f64
            / y.len() as f64;

        assert!(accuracy > 0.9);
        assert_eq!(rf.trees().len(), 10);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = blobs();
        let mut a = RandomForest::new(5).with_random_state(3);
        let mut b = RandomForest::new(5).with_random_state(3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_proba_has_one_column_per_class() {
        let (x, y) = blobs();
        let mut rf = RandomForest::new(4).with_random_state(1);
        rf.fit(&x, &y).unwrap();
        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (60, 3));
        for row in proba.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_feature_importances_sum_to_one() {
        let (x, y) = blobs();
        let mut rf = RandomForest::new(8).with_random_state(0);
        rf.fit(&x, &y).unwrap();
        let total: f64 = rf.feature_importances().unwrap().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_oob_score() {
        let (x, y) = blobs();
        let mut rf = RandomForest::new(20).with_random_state(0).with_oob_score(true);
        rf.fit(&x, &y).unwrap();
        let oob = rf.oob_score().unwrap();
        assert!((0.0..=1.0).contains(&oob));
    }

    #[test]
    fn test_from_params() {
        let params = HyperParams::new()
            .with("n_estimators", 10i64)
            .with("max_depth", 4i64)
            .with("random_state", 0i64);
        let rf = RandomForest::from_params(&params).unwrap();
        assert_eq!(rf.n_estimators, 10);
        assert_eq!(rf.max_depth, Some(4));
        assert_eq!(rf.max_features, MaxFeatures::Sqrt);

        let unknown = HyperParams::new().with("learning_rate", 0.5);
        assert!(RandomForest::from_params(&unknown).is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let rf = RandomForest::new(3);
        assert!(matches!(
            rf.predict(&Array2::zeros((1, 3))),
            Err(PipelineError::ModelNotFitted)
        ));
    }
}
