//! Model training module
//!
//! Tree-based classifiers built from `ModelSpec`s:
//! - Decision trees (gini/entropy, best or random splits)
//! - Random Forests (bootstrap, per-split feature sampling, soft voting)
//! - AdaBoost on decision stumps (SAMME, SAMME.R)
//!
//! plus K-fold splitters and cross-validated grid search.

mod models;
mod params;
pub mod adaboost;
pub mod cross_validation;
pub mod decision_tree;
pub mod grid_search;
pub mod random_forest;

pub use adaboost::{AdaBoostClassifier, BoostAlgorithm};
pub use cross_validation::{CVResults, CVSplit, CVStrategy, CrossValidator};
pub use decision_tree::{Criterion, DecisionTree, MaxFeatures, SplitStrategy, TreeNode};
pub use grid_search::{CandidateResult, GridSearch, GridSearchResult, SearchResults};
pub use models::{Classifier, ModelKind, ModelSpec, TrainedModel};
pub use params::{HyperParams, ParamGrid, ParamValue};
pub use random_forest::RandomForest;

use crate::error::Result;
use ndarray::{Array1, Array2};
use std::time::Instant;
use tracing::info;

/// Build and fit the model described by `spec`
pub fn train(spec: &ModelSpec, x: &Array2<f64>, y: &Array1<f64>) -> Result<TrainedModel> {
    let start = Instant::now();
    let mut model = spec.build()?;
    model.fit(x, y)?;

    info!(
        model = %spec.kind,
        params = %spec.params.describe(),
        samples = x.nrows(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "trained model"
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_train_fits_model() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let spec = ModelSpec::new(ModelKind::RandomForest)
            .with_params(HyperParams::new().with("n_estimators", 3i64).with("random_state", 0i64));
        let model = train(&spec, &x, &y).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.kind(), ModelKind::RandomForest);
    }
}
