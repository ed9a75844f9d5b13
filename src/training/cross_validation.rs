//! Cross-validation splitters

use crate::error::{PipelineError, Result};
use crate::utils::{class_position, unique_classes};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Cross-validation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CVStrategy {
    /// K-Fold cross-validation
    KFold { n_splits: usize, shuffle: bool },
    /// Stratified K-Fold (maintains class distribution)
    StratifiedKFold { n_splits: usize, shuffle: bool },
}

impl Default for CVStrategy {
    fn default() -> Self {
        CVStrategy::StratifiedKFold { n_splits: 5, shuffle: false }
    }
}

impl CVStrategy {
    pub fn n_splits(&self) -> usize {
        match *self {
            CVStrategy::KFold { n_splits, .. } | CVStrategy::StratifiedKFold { n_splits, .. } => n_splits,
        }
    }
}

/// A single train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Cross-validation splitter
#[derive(Debug, Clone)]
pub struct CrossValidator {
    strategy: CVStrategy,
    random_state: u64,
}

impl CrossValidator {
    /// Create a new cross-validator
    pub fn new(strategy: CVStrategy) -> Self {
        Self {
            strategy,
            random_state: 42,
        }
    }

    /// Unshuffled stratified folds
    pub fn stratified(n_splits: usize) -> Self {
        Self::new(CVStrategy::StratifiedKFold { n_splits, shuffle: false })
    }

    /// Set the seed used when shuffling
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn strategy(&self) -> CVStrategy {
        self.strategy
    }

    /// Generate train/test splits
    pub fn split(&self, n_samples: usize, y: Option<&Array1<f64>>) -> Result<Vec<CVSplit>> {
        match self.strategy {
            CVStrategy::KFold { n_splits, shuffle } => self.k_fold_split(n_samples, n_splits, shuffle),
            CVStrategy::StratifiedKFold { n_splits, shuffle } => {
                let y = y.ok_or_else(|| {
                    PipelineError::ValidationError("StratifiedKFold requires target array".to_string())
                })?;
                if y.len() != n_samples {
                    return Err(PipelineError::ShapeError {
                        expected: format!("y length = {}", n_samples),
                        actual: format!("y length = {}", y.len()),
                    });
                }
                self.stratified_k_fold_split(y, n_splits, shuffle)
            }
        }
    }

    fn check_n_splits(n_samples: usize, n_splits: usize) -> Result<()> {
        if n_splits < 2 {
            return Err(PipelineError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < n_splits {
            return Err(PipelineError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, n_splits
            )));
        }
        Ok(())
    }

    fn k_fold_split(&self, n_samples: usize, n_splits: usize, shuffle: bool) -> Result<Vec<CVSplit>> {
        Self::check_n_splits(n_samples, n_splits)?;

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if shuffle {
            indices.shuffle(&mut ChaCha8Rng::seed_from_u64(self.random_state));
        }

        // First n_samples % n_splits folds get one extra row
        let mut fold_of = vec![0usize; n_samples];
        let mut current = 0;
        for fold_idx in 0..n_splits {
            let base = n_samples / n_splits;
            let fold_size = if fold_idx < n_samples % n_splits { base + 1 } else { base };
            for &idx in &indices[current..current + fold_size] {
                fold_of[idx] = fold_idx;
            }
            current += fold_size;
        }

        Ok(Self::splits_from_assignment(&fold_of, n_splits))
    }

    /// Per-class fold sizes follow a round-robin over the label-sorted rows,
    /// so every fold's class mix is as close as possible to the whole set.
    /// Within a class, rows fill folds in order of appearance.
    fn stratified_k_fold_split(&self, y: &Array1<f64>, n_splits: usize, shuffle: bool) -> Result<Vec<CVSplit>> {
        let n_samples = y.len();
        Self::check_n_splits(n_samples, n_splits)?;

        let classes = unique_classes(y);
        let codes: Vec<usize> = y
            .iter()
            .map(|&v| class_position(&classes, v).unwrap_or(0))
            .collect();

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); classes.len()];
        for (idx, &code) in codes.iter().enumerate() {
            members[code].push(idx);
        }

        let largest = members.iter().map(Vec::len).max().unwrap_or(0);
        if n_splits > largest {
            return Err(PipelineError::ValidationError(format!(
                "n_splits={} cannot be greater than the number of members in each class ({})",
                n_splits, largest
            )));
        }
        let smallest = members.iter().map(Vec::len).min().unwrap_or(0);
        if smallest < n_splits {
            warn!(
                smallest,
                n_splits,
                "least populated class has fewer members than n_splits"
            );
        }

        if shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
            for class_members in &mut members {
                class_members.shuffle(&mut rng);
            }
        }

        let mut sorted_codes = codes.clone();
        sorted_codes.sort_unstable();
        let mut allocation = vec![vec![0usize; classes.len()]; n_splits];
        for (pos, &code) in sorted_codes.iter().enumerate() {
            allocation[pos % n_splits][code] += 1;
        }

        let mut fold_of = vec![0usize; n_samples];
        for (code, class_members) in members.iter().enumerate() {
            let mut rows = class_members.iter();
            for (fold_idx, per_fold) in allocation.iter().enumerate() {
                for &idx in rows.by_ref().take(per_fold[code]) {
                    fold_of[idx] = fold_idx;
                }
            }
        }

        Ok(Self::splits_from_assignment(&fold_of, n_splits))
    }

    /// Index lists come out sorted ascending
    fn splits_from_assignment(fold_of: &[usize], n_splits: usize) -> Vec<CVSplit> {
        (0..n_splits)
            .map(|fold_idx| {
                let (test_indices, train_indices): (Vec<usize>, Vec<usize>) =
                    (0..fold_of.len()).partition(|&i| fold_of[i] == fold_idx);
                CVSplit {
                    train_indices,
                    test_indices,
                    fold_idx,
                }
            })
            .collect()
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        let mean_score = scores.iter().sum::<f64>() / n_folds.max(1) as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds.max(1) as f64;
        let std_score = variance.sqrt();

        Self {
            scores,
            mean_score,
            std_score,
            n_folds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold() {
        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 5, shuffle: false });
        let splits = cv.split(100, None).unwrap();

        assert_eq!(splits.len(), 5);

        // Each test set should have 20 samples
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }

        // All indices should be covered exactly once in test sets
        let mut all_test: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        all_test.sort();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());
        assert_eq!(splits[0].test_indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_k_fold_uneven() {
        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 3, shuffle: true }).with_random_state(1);
        let splits = cv.split(10, None).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_stratified_k_fold() {
        let y = Array1::from_vec(vec![
            0.0, 0.0, 0.0, 0.0, 0.0,  // 5 samples of class 0
            1.0, 1.0, 1.0, 1.0, 1.0,  // 5 samples of class 1
        ]);

        let cv = CrossValidator::stratified(5);
        let splits = cv.split(10, Some(&y)).unwrap();

        assert_eq!(splits.len(), 5);

        // Each fold should have 1 sample from each class
        for (k, split) in splits.iter().enumerate() {
            assert_eq!(split.test_indices, vec![k, k + 5]);
        }
    }

    #[test]
    fn test_stratified_keeps_proportions() {
        // 20 of class 0, 10 of class 1, interleaved
        let y = Array1::from_iter((0..30).map(|i| if i % 3 == 2 { 1.0 } else { 0.0 }));
        let splits = CrossValidator::stratified(10).split(30, Some(&y)).unwrap();
        for split in &splits {
            let ones = split.test_indices.iter().filter(|&&i| y[i] == 1.0).count();
            assert_eq!(split.test_indices.len(), 3);
            assert_eq!(ones, 1);
        }
    }

    #[test]
    fn test_stratified_is_deterministic_without_shuffle() {
        let y = Array1::from_iter((0..50).map(|i| (i % 3) as f64));
        let a = CrossValidator::stratified(3).split(50, Some(&y)).unwrap();
        let b = CrossValidator::stratified(3).with_random_state(9).split(50, Some(&y)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_many_splits() {
        let y = Array1::from_vec(vec![0.0, 0.0, 1.0, 1.0]);
        assert!(CrossValidator::stratified(3).split(4, Some(&y)).is_err());
        assert!(CrossValidator::stratified(1).split(4, Some(&y)).is_err());
    }

    #[test]
    fn test_cv_results() {
        let results = CVResults::from_scores(vec![0.5, 1.0]);
        assert_eq!(results.mean_score, 0.75);
        assert_eq!(results.std_score, 0.25);
        assert_eq!(results.n_folds, 2);
    }
}
