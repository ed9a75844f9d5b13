//! Decision tree classifier

use crate::error::{PipelineError, Result};
use crate::utils::{argmax, class_position, unique_classes};
use super::params::HyperParams;
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the weighted class distribution of its samples
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity
    Gini,
    /// Entropy
    Entropy,
}

/// How split thresholds are chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Best threshold over every distinct value
    Best,
    /// One random threshold per candidate feature
    Random,
}

/// Number of features considered at each split
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fraction of n_features
    Fraction(f64),
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        match *self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        }
        .clamp(1, n_features.max(1))
    }

    pub(crate) fn from_params(params: &HyperParams, name: &str) -> Result<Option<Self>> {
        if let Ok(Some(n)) = params.usize(name) {
            return Ok(Some(MaxFeatures::Fixed(n)));
        }
        if let Ok(Some(f)) = params.f64(name) {
            return Ok(Some(MaxFeatures::Fraction(f)));
        }
        match params.text(name)? {
            None => Ok(None),
            Some("sqrt") => Ok(Some(MaxFeatures::Sqrt)),
            Some("log2") => Ok(Some(MaxFeatures::Log2)),
            Some("all") | Some("None") => Ok(Some(MaxFeatures::All)),
            Some(other) => Err(PipelineError::InvalidParameter {
                name: name.to_string(),
                value: other.to_string(),
                reason: "expected sqrt, log2, all, an integer or a fraction".to_string(),
            }),
        }
    }
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Threshold selection
    pub splitter: SplitStrategy,
    /// Seed for feature sampling and random thresholds
    pub random_state: Option<u64>,
    /// Number of features
    n_features: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Class labels seen during fit, sorted
    classes: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows reaching a node, in class-index form
struct NodeData<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            criterion: Criterion::Gini,
            splitter: SplitStrategy::Best,
            random_state: None,
            n_features: 0,
            feature_importances: None,
            classes: Vec::new(),
        }
    }

    /// Build from named hyperparameters
    pub fn from_params(params: &HyperParams) -> Result<Self> {
        params.check_known(
            &[
                "criterion",
                "splitter",
                "max_depth",
                "min_samples_split",
                "min_samples_leaf",
                "max_features",
                "random_state",
            ],
            "DecisionTree",
        )?;

        let mut tree = Self::new();
        if let Some(criterion) = params.text("criterion")? {
            tree.criterion = match criterion {
                "gini" => Criterion::Gini,
                "entropy" => Criterion::Entropy,
                other => {
                    return Err(PipelineError::InvalidParameter {
                        name: "criterion".to_string(),
                        value: other.to_string(),
                        reason: "expected gini or entropy".to_string(),
                    })
                }
            };
        }
        if let Some(splitter) = params.text("splitter")? {
            tree.splitter = match splitter {
                "best" => SplitStrategy::Best,
                "random" => SplitStrategy::Random,
                other => {
                    return Err(PipelineError::InvalidParameter {
                        name: "splitter".to_string(),
                        value: other.to_string(),
                        reason: "expected best or random".to_string(),
                    })
                }
            };
        }
        if let Some(depth) = params.optional_usize("max_depth")? {
            tree.max_depth = depth;
        }
        if let Some(n) = params.usize("min_samples_split")? {
            tree.min_samples_split = n;
        }
        if let Some(n) = params.usize("min_samples_leaf")? {
            tree.min_samples_leaf = n;
        }
        if let Some(mf) = MaxFeatures::from_params(params, "max_features")? {
            tree.max_features = mf;
        }
        if let Some(seed) = params.usize("random_state")? {
            tree.random_state = Some(seed as u64);
        }
        tree.validate()?;
        Ok(tree)
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

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set threshold selection strategy
    pub fn with_splitter(mut self, splitter: SplitStrategy) -> Self {
        self.splitter = splitter;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(PipelineError::InvalidParameter {
                name: "min_samples_split".to_string(),
                value: self.min_samples_split.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(PipelineError::InvalidParameter {
                name: "min_samples_leaf".to_string(),
                value: self.min_samples_leaf.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_depth == Some(0) {
            return Err(PipelineError::InvalidParameter {
                name: "max_depth".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let classes = unique_classes(y);
        let weights = vec![1.0; y.len()];
        self.fit_weighted(x, y, &classes, &weights)
    }

    /// Fit with per-sample weights against a known class list
    ///
    /// `classes` may contain labels absent from `y`; leaf distributions always
    /// have one entry per class so ensembles can combine them.
    pub fn fit_weighted(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        classes: &[f64],
        weights: &[f64],
    ) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() || n_samples != weights.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y and weights length = {}", n_samples),
                actual: format!("y length = {}, weights length = {}", y.len(), weights.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::ValidationError("cannot fit on zero samples".to_string()));
        }
        self.validate()?;

        let y_idx: Vec<usize> = y
            .iter()
            .map(|&v| {
                class_position(classes, v).ok_or_else(|| {
                    PipelineError::ValidationError(format!("label {} not in class list", v))
                })
            })
            .collect::<Result<_>>()?;

        self.n_features = n_features;
        self.classes = classes.to_vec();

        let data = NodeData {
            x,
            y: &y_idx,
            weights,
            n_classes: classes.len(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(42));
        let mut importances = vec![0.0; n_features];

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(&data, &indices, 0, &mut importances, &mut rng));

        // Normalize feature importances
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn class_weights(data: &NodeData, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; data.n_classes];
        for &i in indices {
            counts[data.y[i]] += data.weights[i];
        }
        counts
    }

    fn build_tree(
        &self,
        data: &NodeData,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = Self::class_weights(data, indices);
        let total: f64 = counts.iter().sum();

        let is_pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure
            || total <= 0.0;

        if should_stop {
            return Self::leaf(&counts, n_samples);
        }

        let parent_impurity = self.impurity(&counts, total);

        match self.find_best_split(data, indices, parent_impurity, rng) {
            Some((feature_idx, threshold, gain)) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| data.x[[i, feature_idx]] <= threshold);

                importances[feature_idx] += total * gain;

                let left = Box::new(self.build_tree(data, &left_indices, depth + 1, importances, rng));
                let right = Box::new(self.build_tree(data, &right_indices, depth + 1, importances, rng));

                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    n_samples,
                    impurity: parent_impurity,
                }
            }
            None => Self::leaf(&counts, n_samples),
        }
    }

    fn leaf(counts: &[f64], n_samples: usize) -> TreeNode {
        let total: f64 = counts.iter().sum();
        let distribution = if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![1.0 / counts.len().max(1) as f64; counts.len()]
        };
        TreeNode::Leaf {
            distribution,
            n_samples,
        }
    }

    /// Best (feature, threshold, impurity decrease) over the candidate features
    fn find_best_split(
        &self,
        data: &NodeData,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, f64)> {
        let n_features = data.x.ncols();
        let n_candidates = self.max_features.resolve(n_features);

        let mut candidates: Vec<usize> = if n_candidates < n_features {
            sample(rng, n_features, n_candidates).into_vec()
        } else {
            (0..n_features).collect()
        };
        candidates.sort_unstable();

        // Draws happen here so the parallel scan stays deterministic
        let draws: Vec<f64> = match self.splitter {
            SplitStrategy::Random => candidates.iter().map(|_| rng.gen::<f64>()).collect(),
            SplitStrategy::Best => Vec::new(),
        };

        let results: Vec<Option<(usize, f64, f64)>> = candidates
            .par_iter()
            .enumerate()
            .map(|(k, &feature_idx)| match self.splitter {
                SplitStrategy::Best => self.best_threshold(data, indices, feature_idx, parent_impurity),
                SplitStrategy::Random => {
                    self.random_threshold(data, indices, feature_idx, parent_impurity, draws[k])
                }
            })
            .collect();

        // Ties go to the lowest feature index
        let mut best: Option<(usize, f64, f64)> = None;
        for candidate in results.into_iter().flatten() {
            if best.map_or(true, |b| candidate.2 > b.2) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Sweep the sorted feature values, moving one row at a time to the left child
    fn best_threshold(
        &self,
        data: &NodeData,
        indices: &[usize],
        feature_idx: usize,
        parent_impurity: f64,
    ) -> Option<(usize, f64, f64)> {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            data.x[[a, feature_idx]]
                .partial_cmp(&data.x[[b, feature_idx]])
                .unwrap_or(Ordering::Equal)
        });

        let mut right = Self::class_weights(data, indices);
        let total: f64 = right.iter().sum();
        let mut left = vec![0.0; data.n_classes];
        let mut left_weight = 0.0;

        let mut best_gain = 0.0f64;
        let mut best_threshold = None;

        for pos in 0..order.len() - 1 {
            let i = order[pos];
            let w = data.weights[i];
            left[data.y[i]] += w;
            right[data.y[i]] -= w;
            left_weight += w;

            let current = data.x[[i, feature_idx]];
            let next = data.x[[order[pos + 1], feature_idx]];
            if next <= current {
                continue;
            }

            let n_left = pos + 1;
            let n_right = order.len() - n_left;
            if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                continue;
            }

            let right_weight = total - left_weight;
            if left_weight <= 0.0 || right_weight <= 0.0 {
                continue;
            }

            let weighted = (left_weight * self.impurity(&left, left_weight)
                + right_weight * self.impurity(&right, right_weight))
                / total;
            let gain = parent_impurity - weighted;
            if gain > best_gain + 1e-12 {
                best_gain = gain;
                best_threshold = Some((current + next) / 2.0);
            }
        }

        best_threshold.map(|t| (feature_idx, t, best_gain))
    }

    fn random_threshold(
        &self,
        data: &NodeData,
        indices: &[usize],
        feature_idx: usize,
        parent_impurity: f64,
        draw: f64,
    ) -> Option<(usize, f64, f64)> {
        let (min, max) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
            let v = data.x[[i, feature_idx]];
            (lo.min(v), hi.max(v))
        });
        if max <= min {
            return None;
        }
        let threshold = min + draw * (max - min);

        let mut left = vec![0.0; data.n_classes];
        let mut right = vec![0.0; data.n_classes];
        let mut n_left = 0;
        for &i in indices {
            if data.x[[i, feature_idx]] <= threshold {
                left[data.y[i]] += data.weights[i];
                n_left += 1;
            } else {
                right[data.y[i]] += data.weights[i];
            }
        }
        let n_right = indices.len() - n_left;
        if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
            return None;
        }

        let left_weight: f64 = left.iter().sum();
        let right_weight: f64 = right.iter().sum();
        let total = left_weight + right_weight;
        if left_weight <= 0.0 || right_weight <= 0.0 {
            return None;
        }

        let weighted = (left_weight * self.impurity(&left, left_weight)
            + right_weight * self.impurity(&right, right_weight))
            / total;
        let gain = parent_impurity - weighted;
        (gain > 1e-12).then_some((feature_idx, threshold, gain))
    }

    fn impurity(&self, counts: &[f64], total: f64) -> f64 {
        if total <= 0.0 {
            return 0.0;
        }
        match self.criterion {
            Criterion::Gini => {
                1.0 - counts.iter().map(|&c| (c / total).powi(2)).sum::<f64>()
            }
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0.0)
                .map(|&c| {
                    let p = c / total;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }

    /// Class probabilities, one column per entry of `classes()`
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        self.check_width(x)?;

        let n_classes = self.classes.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (i, row) in x.outer_iter().enumerate() {
            let distribution = Self::leaf_distribution(root, row);
            for (j, &p) in distribution.iter().enumerate() {
                proba[[i, j]] = p;
            }
        }
        Ok(proba)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .outer_iter()
            .map(|row| self.classes[argmax(row)])
            .collect())
    }

    fn leaf_distribution<'a>(node: &'a TreeNode, sample: ArrayView1<f64>) -> &'a [f64] {
        match node {
            TreeNode::Leaf { distribution, .. } => distribution,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::leaf_distribution(left, sample)
                } else {
                    Self::leaf_distribution(right, sample)
                }
            }
        }
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Classes seen during fit
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Get tree depth (a single leaf has depth 0)
    pub fn get_depth(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => Self::node_depth(node),
        }
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => {
                1 + Self::node_depth(left).max(Self::node_depth(right))
            }
        }
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => Self::count_leaves(node),
        }
    }

    fn count_leaves(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                Self::count_leaves(left) + Self::count_leaves(right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_simple() {
        let x = array![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [1.0, 1.0],
        ];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_multiclass() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0], [20.0], [21.0], [22.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

        let mut tree = DecisionTree::new().with_criterion(Criterion::Entropy);
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.classes(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_max_depth() {
        let x = array![
            [1.0, 1.0],
            [2.0, 2.0],
            [3.0, 3.0],
            [4.0, 4.0],
            [5.0, 1.0],
            [6.0, 2.0],
        ];
        let y = array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        assert!(tree.get_depth() <= 1);
        assert!(tree.get_n_leaves() <= 2);
    }

    #[test]
    fn test_feature_importances() {
        let x = array![
            [1.0, 0.0],
            [2.0, 0.0],
            [3.0, 0.0],
            [4.0, 0.0],
        ];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert_eq!(importances[0], 1.0);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let x = array![[0.0], [0.0], [1.0], [1.0], [1.0]];
        let y = array![0.0, 1.0, 1.0, 1.0, 0.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 2);
        for row in proba.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        assert!((proba[[2, 1]] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_weights_shift_majority() {
        let x = array![[0.0], [0.0], [0.0]];
        let y = array![0.0, 0.0, 1.0];
        let classes = [0.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit_weighted(&x, &y, &classes, &[1.0, 1.0, 5.0]).unwrap();
        assert_eq!(tree.predict(&array![[0.0]]).unwrap()[0], 1.0);
    }

    #[test]
    fn test_random_splitter_is_seeded() {
        let x = Array2::from_shape_fn((30, 3), |(i, j)| ((i * 7 + j * 3) % 11) as f64);
        let y = Array1::from_iter((0..30).map(|i| (i % 2) as f64));

        let build = || {
            let mut tree = DecisionTree::new()
                .with_splitter(SplitStrategy::Random)
                .with_random_state(5);
            tree.fit(&x, &y).unwrap();
            tree.predict(&x).unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_from_params() {
        let params = HyperParams::new()
            .with("criterion", "entropy")
            .with("max_depth", 5i64)
            .with("splitter", "best");
        let tree = DecisionTree::from_params(&params).unwrap();
        assert_eq!(tree.criterion, Criterion::Entropy);
        assert_eq!(tree.max_depth, Some(5));

        let bad = HyperParams::new().with("criterion", "mse");
        assert!(DecisionTree::from_params(&bad).is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTree::new();
        assert!(matches!(tree.predict(&array![[1.0]]), Err(PipelineError::ModelNotFitted)));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let mut tree = DecisionTree::new();
        tree.fit(&array![[0.0, 1.0], [1.0, 0.0]], &array![0.0, 1.0]).unwrap();
        assert!(tree.predict(&array![[0.0]]).is_err());
    }
}
