//! Case-outcome classification pipeline
//!
//! Predicts the outcome of a recorded case (e.g. deceased, hospitalized,
//! recovered) from its demographic and geographic attributes.
//!
//! # Modules
//!
//! ## Pipeline stages
//! - [`utils`] - CSV loading and saving, label helpers
//! - [`preprocessing`] - Ordinal and one-hot encoding, train/test split
//! - [`training`] - Decision trees, Random Forest, AdaBoost, grid search
//! - [`evaluation`] - Accuracy, per-class metrics, cross-validation
//! - [`export`] - Model persistence
//!
//! ## Runs
//! - [`config`] - Paths and hyperparameters for every run
//! - [`runs`] - The train, tune and baseline runs
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Pipeline stages
pub mod utils;
pub mod preprocessing;
pub mod training;
pub mod evaluation;
pub mod export;

// Runs
pub mod config;
pub mod runs;
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PipelineError, Result};

    // Configuration
    pub use crate::config::PipelineConfig;

    // Data
    pub use crate::utils::{DataLoader, DataSaver};

    // Preprocessing
    pub use crate::preprocessing::{
        prepare_dataset, train_test_split, CaseEncoder, EncodedDataset, EncoderConfig, SplitConfig,
        TrainTestSplit,
    };

    // Training
    pub use crate::training::{
        AdaBoostClassifier, Classifier, CrossValidator, DecisionTree, GridSearch, HyperParams, ModelKind,
        ModelSpec, ParamGrid, RandomForest, TrainedModel,
    };

    // Evaluation
    pub use crate::evaluation::{accuracy_score, classification_report, cross_validate, Scorer};

    // Export
    pub use crate::export::ModelArtifact;
}
