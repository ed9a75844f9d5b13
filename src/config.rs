//! Pipeline configuration
//!
//! Every path and hyperparameter the runs use lives here. Defaults reproduce
//! the reference runs; a JSON file can override any subset of fields.

use crate::error::{PipelineError, Result};
use crate::evaluation::{deceased_scorers, Scorer};
use crate::preprocessing::{EncoderConfig, SplitConfig};
use crate::training::{HyperParams, ModelKind, ModelSpec, ParamGrid};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for the `train` run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainRunConfig {
    pub split: SplitConfig,
    pub cv_folds: usize,
    /// Fitted and reported in order
    pub models: Vec<ModelSpec>,
}

impl Default for TrainRunConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::new(0.2, 0),
            cv_folds: 10,
            models: vec![
                ModelSpec::new(ModelKind::AdaBoost).with_params(
                    HyperParams::new()
                        .with("n_estimators", 20i64)
                        .with("learning_rate", 0.8)
                        .with("random_state", 0i64),
                ),
                ModelSpec::new(ModelKind::RandomForest).with_params(
                    HyperParams::new()
                        .with("n_estimators", 10i64)
                        .with("random_state", 0i64),
                ),
            ],
        }
    }
}

/// Settings for the `tune` run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneRunConfig {
    /// Only the first rows of the input are used
    pub row_limit: Option<usize>,
    pub split: SplitConfig,
    pub cv_folds: usize,
    /// Fixed parameters; the grid is layered on top
    pub model: ModelSpec,
    pub grid: ParamGrid,
    pub scorers: Vec<Scorer>,
    /// Name of the scorer that selects the best combination
    pub refit: String,
    pub results_path: PathBuf,
}

impl Default for TuneRunConfig {
    fn default() -> Self {
        Self {
            row_limit: Some(400),
            split: SplitConfig::new(0.2, 0).with_stratify(true),
            cv_folds: 3,
            model: ModelSpec::new(ModelKind::AdaBoost)
                .with_params(HyperParams::new().with("random_state", 0i64)),
            grid: ParamGrid::new()
                .with("n_estimators", vec![10i64.into()])
                .with("learning_rate", vec![1i64.into(), 0.5.into(), 0.1.into()])
                .with("algorithm", vec!["SAMME".into(), "SAMME.R".into()]),
            scorers: deceased_scorers(),
            refit: "f1_score_on_deceased".to_string(),
            results_path: PathBuf::from("results/tuning-results-adaboost.csv"),
        }
    }
}

/// Settings for the `baseline` run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineRunConfig {
    pub split: SplitConfig,
    pub model: ModelSpec,
}

impl Default for BaselineRunConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::new(0.2, 0).with_stratify(true),
            model: ModelSpec::new(ModelKind::DecisionTree).with_params(
                HyperParams::new()
                    .with("criterion", "gini")
                    .with("splitter", "best")
                    .with("max_depth", 5i64),
            ),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Processed case records (CSV with header)
    pub data_path: PathBuf,
    /// Directory model artifacts are written to
    pub models_dir: PathBuf,
    pub encoder: EncoderConfig,
    pub train: TrainRunConfig,
    pub tune: TuneRunConfig,
    pub baseline: BaselineRunConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/cases_train_processed.csv"),
            models_dir: PathBuf::from("models"),
            encoder: EncoderConfig::default(),
            train: TrainRunConfig::default(),
            tune: TuneRunConfig::default(),
            baseline: BaselineRunConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            PipelineError::ConfigError(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tune.results_path = path.into();
        self
    }

    pub fn with_encoder(mut self, encoder: EncoderConfig) -> Self {
        self.encoder = encoder;
        self
    }

    /// Where the artifact for `name` is stored
    pub fn model_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(format!("{}.bin", name))
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        for (run, folds) in [("train", self.train.cv_folds), ("tune", self.tune.cv_folds)] {
            if folds < 2 {
                return Err(PipelineError::ConfigError(format!(
                    "{}.cv_folds must be at least 2, got {}",
                    run, folds
                )));
            }
        }

        for (run, split) in [
            ("train", &self.train.split),
            ("tune", &self.tune.split),
            ("baseline", &self.baseline.split),
        ] {
            if !(split.test_fraction > 0.0 && split.test_fraction < 1.0) {
                return Err(PipelineError::ConfigError(format!(
                    "{}.split.test_fraction must be in (0, 1), got {}",
                    run, split.test_fraction
                )));
            }
        }

        if self.tune.row_limit == Some(0) {
            return Err(PipelineError::ConfigError("tune.row_limit must be positive".to_string()));
        }
        if self.tune.grid.is_empty() {
            return Err(PipelineError::ConfigError("tune.grid is empty".to_string()));
        }
        if !self.tune.scorers.iter().any(|s| s.name == self.tune.refit) {
            return Err(PipelineError::ConfigError(format!(
                "tune.refit '{}' does not name a scorer",
                self.tune.refit
            )));
        }

        // Surface bad hyperparameters before any data is loaded
        for spec in self.train.models.iter().chain(std::iter::once(&self.baseline.model)) {
            spec.build()?;
        }
        for combo in self.tune.grid.combinations() {
            self.tune.model.with_overrides(&combo).build()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.train.models.len(), 2);
        assert_eq!(config.tune.grid.len(), 6);
        assert_eq!(config.tune.row_limit, Some(400));
        assert!(config.tune.split.stratify);
        assert!(!config.train.split.stratify);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"data_path": "other.csv", "tune": {"cv_folds": 5, "row_limit": null}}"#,
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.tune.cv_folds, 5);
        assert_eq!(config.tune.row_limit, None);
        assert_eq!(config.tune.refit, "f1_score_on_deceased");
        assert_eq!(config.models_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_json_model_kinds_by_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "train": {"models": [
                    {"kind": "adaboost", "params": {"n_estimators": 5}},
                    {"kind": "random_forest", "params": {"n_estimators": 3}}
                ]},
                "baseline": {"model": {"kind": "decision_tree", "params": {"max_depth": 3}}},
                "tune": {"model": {"kind": "adaboost", "params": {"random_state": 1}}}
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        let kinds: Vec<ModelKind> = config.train.models.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![ModelKind::AdaBoost, ModelKind::RandomForest]);
        assert_eq!(config.baseline.model.kind, ModelKind::DecisionTree);
        assert_eq!(config.tune.model.kind, ModelKind::AdaBoost);
    }

    #[test]
    fn test_default_config_survives_json() {
        let json = serde_json::to_string(&PipelineConfig::default()).unwrap();
        assert!(json.contains(r#""kind":"adaboost""#));
        let config: PipelineConfig = serde_json::from_str(&json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.tune.model.kind, ModelKind::AdaBoost);
    }

    #[test]
    fn test_bad_refit_rejected() {
        let mut config = PipelineConfig::default();
        config.tune.refit = "nothing".to_string();
        assert!(matches!(config.validate(), Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_bad_hyperparameter_rejected() {
        let mut config = PipelineConfig::default();
        config.baseline.model = ModelSpec::new(ModelKind::DecisionTree)
            .with_params(HyperParams::new().with("criterion", "mse"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_path() {
        let config = PipelineConfig::new().with_models_dir("out");
        assert_eq!(config.model_path("adaboost"), PathBuf::from("out/adaboost.bin"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PipelineConfig::from_json_file("/nonexistent/config.json"),
            Err(PipelineError::ConfigError(_))
        ));
    }
}
