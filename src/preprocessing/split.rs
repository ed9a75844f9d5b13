//! Train/test partitioning

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How to partition rows into train and test subsets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows assigned to the test subset
    pub test_fraction: f64,
    /// Seed for the shuffling RNG
    pub random_state: u64,
    /// Preserve label proportions in both subsets
    pub stratify: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            random_state: 0,
            stratify: false,
        }
    }
}

impl SplitConfig {
    pub fn new(test_fraction: f64, random_state: u64) -> Self {
        Self {
            test_fraction,
            random_state,
            stratify: false,
        }
    }

    pub fn with_stratify(mut self, stratify: bool) -> Self {
        self.stratify = stratify;
        self
    }
}

/// Disjoint row indices of the two subsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Materialized train/test subsets
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

impl Split {
    /// Compute a split for `n_samples` rows; `labels` is required when stratifying
    pub fn compute(n_samples: usize, labels: Option<&Array1<f64>>, config: &SplitConfig) -> Result<Self> {
        let (n_train, n_test) = partition_sizes(n_samples, config.test_fraction)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.random_state);

        let split = if config.stratify {
            let labels = labels.ok_or_else(|| {
                PipelineError::ValidationError("stratified split requires labels".to_string())
            })?;
            if labels.len() != n_samples {
                return Err(PipelineError::ShapeError {
                    expected: format!("labels length = {}", n_samples),
                    actual: format!("labels length = {}", labels.len()),
                });
            }
            stratified_split(labels, n_train, n_test, &mut rng)?
        } else {
            let mut permutation: Vec<usize> = (0..n_samples).collect();
            permutation.shuffle(&mut rng);
            let train_indices = permutation.split_off(n_test);
            Split {
                train_indices,
                test_indices: permutation,
            }
        };

        debug!(
            train = split.train_indices.len(),
            test = split.test_indices.len(),
            stratify = config.stratify,
            "computed train/test split"
        );

        Ok(split)
    }

    /// Select the rows of `x` and `y` for each subset
    pub fn apply(&self, x: &Array2<f64>, y: &Array1<f64>) -> TrainTestSplit {
        TrainTestSplit {
            x_train: x.select(Axis(0), &self.train_indices),
            y_train: y.select(Axis(0), &self.train_indices),
            x_test: x.select(Axis(0), &self.test_indices),
            y_test: y.select(Axis(0), &self.test_indices),
        }
    }
}

/// Split features and labels in one call
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    config: &SplitConfig,
) -> Result<(TrainTestSplit, Split)> {
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    let split = Split::compute(x.nrows(), Some(y), config)?;
    Ok((split.apply(x, y), split))
}

/// Test size rounds up, train gets the rest
fn partition_sizes(n_samples: usize, test_fraction: f64) -> Result<(usize, usize)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n_test = (test_fraction * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_train == 0 || n_test == 0 {
        return Err(PipelineError::ValidationError(format!(
            "test_fraction {} on {} samples leaves an empty partition",
            test_fraction, n_samples
        )));
    }

    Ok((n_train, n_test))
}

fn stratified_split(
    labels: &Array1<f64>,
    n_train: usize,
    n_test: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Split> {
    let n_samples = labels.len();
    let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, &val) in labels.iter().enumerate() {
        class_indices.entry(val.round() as i64).or_default().push(idx);
    }

    if let Some((class, members)) = class_indices.iter().find(|(_, m)| m.len() < 2) {
        return Err(PipelineError::ValidationError(format!(
            "class {} has only {} member(s); stratified split needs at least 2",
            class,
            members.len()
        )));
    }

    let n_classes = class_indices.len();
    if n_test < n_classes || n_train < n_classes {
        return Err(PipelineError::ValidationError(format!(
            "train size {} and test size {} must both be at least the number of classes ({})",
            n_train, n_test, n_classes
        )));
    }

    let counts: Vec<usize> = class_indices.values().map(Vec::len).collect();
    let mut allocation = allocate_largest_remainder(&counts, n_test, n_samples);
    if let Some(k) = keep_every_class_in_both(&mut allocation, &counts) {
        let class = class_indices.keys().nth(k).copied().unwrap_or_default();
        return Err(PipelineError::ValidationError(format!(
            "class {} has {} member(s) and cannot appear in both partitions",
            class, counts[k]
        )));
    }

    let mut train_indices = Vec::with_capacity(n_train);
    let mut test_indices = Vec::with_capacity(n_test);
    for (members, &take) in class_indices.values_mut().zip(allocation.iter()) {
        members.shuffle(rng);
        test_indices.extend_from_slice(&members[..take]);
        train_indices.extend_from_slice(&members[take..]);
    }

    train_indices.shuffle(rng);
    test_indices.shuffle(rng);

    Ok(Split {
        train_indices,
        test_indices,
    })
}

/// Share `total` among classes in proportion to `counts`, each share within one of exact
fn allocate_largest_remainder(counts: &[usize], total: usize, n_samples: usize) -> Vec<usize> {
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| total as f64 * c as f64 / n_samples as f64)
        .collect();
    let mut allocation: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let assigned: usize = allocation.iter().sum();
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });

    for &k in order.iter().take(total.saturating_sub(assigned)) {
        allocation[k] += 1;
    }

    allocation
}

/// Move single test rows between classes until every share lies in `1..count`
///
/// Largest-remainder rounding can give a small class all of its rows (or none)
/// in the test partition. A donor keeps at least one test row and a receiver
/// keeps at least one train row, so each move fixes one class without breaking
/// another and the total stays exact. Returns the class that could not be placed.
fn keep_every_class_in_both(allocation: &mut [usize], counts: &[usize]) -> Option<usize> {
    loop {
        let Some(k) = (0..counts.len()).find(|&k| allocation[k] == 0 || allocation[k] >= counts[k]) else {
            return None;
        };

        if allocation[k] == 0 {
            // Take from the class with the most test rows to spare
            let Some(donor) = (0..counts.len())
                .filter(|&d| allocation[d] > 1)
                .max_by_key(|&d| (allocation[d], std::cmp::Reverse(d)))
            else {
                return Some(k);
            };
            allocation[donor] -= 1;
            allocation[k] += 1;
        } else {
            // Give to the class with the most train rows to spare
            let Some(receiver) = (0..counts.len())
                .filter(|&r| allocation[r] + 1 < counts[r])
                .max_by_key(|&r| (counts[r] - allocation[r], std::cmp::Reverse(r)))
            else {
                return Some(k);
            };
            allocation[receiver] += 1;
            allocation[k] -= 1;
        }
    }
}
