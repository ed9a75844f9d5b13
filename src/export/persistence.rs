//! Fitted-model persistence

use crate::error::{PipelineError, Result};
use crate::preprocessing::CaseEncoder;
use crate::training::{Classifier, ModelKind, ModelSpec, TrainedModel};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// A fitted model with everything needed to use it on new data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: TrainedModel,
    pub kind: ModelKind,
    /// Hyperparameters as JSON; parameter values are untagged and need a
    /// self-describing format
    params_json: String,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    /// Fitted encoder, when the artifact should encode raw tables itself
    pub encoder: Option<CaseEncoder>,
    pub created_at: DateTime<Utc>,
    pub crate_version: String,
}

impl ModelArtifact {
    /// Wrap a fitted model
    pub fn new(
        model: TrainedModel,
        spec: &ModelSpec,
        feature_names: Vec<String>,
        class_names: Vec<String>,
    ) -> Result<Self> {
        if !model.is_fitted() {
            return Err(PipelineError::ModelNotFitted);
        }
        if model.kind() != spec.kind {
            return Err(PipelineError::ValidationError(format!(
                "model is a {} but its ModelSpec names {}",
                model.kind(),
                spec.kind
            )));
        }
        Ok(Self {
            kind: spec.kind,
            params_json: serde_json::to_string(&spec.params)?,
            model,
            feature_names,
            class_names,
            encoder: None,
            created_at: Utc::now(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    pub fn with_encoder(mut self, encoder: CaseEncoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// The `ModelSpec` the model was built from
    pub fn spec(&self) -> Result<ModelSpec> {
        Ok(ModelSpec {
            kind: self.kind,
            params: serde_json::from_str(&self.params_json)?,
        })
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.model.predict(x)
    }

    /// Predicted class names instead of codes
    pub fn predict_names(&self, x: &Array2<f64>) -> Result<Vec<String>> {
        self.predict(x)?
            .iter()
            .map(|&code| {
                self.class_names.get(code as usize).cloned().ok_or_else(|| {
                    PipelineError::ValidationError(format!("predicted code {} has no class name", code))
                })
            })
            .collect()
    }

    /// Encode raw records with the stored encoder and predict class names
    ///
    /// The target column is not read, so unlabeled records are accepted.
    pub fn predict_records(&self, df: &DataFrame) -> Result<Vec<String>> {
        let encoder = self.encoder.as_ref().ok_or_else(|| {
            PipelineError::ValidationError("artifact was saved without an encoder".to_string())
        })?;
        let features = encoder.transform_features(df)?;
        self.predict_names(&features)
    }

    /// Serialize with bincode, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                PipelineError::DataError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let bytes = bincode::serialize(self).map_err(|e| {
            PipelineError::SerializationError(format!("Failed to serialize model: {}", e))
        })?;

        let file = File::create(path).map_err(|e| {
            PipelineError::DataError(format!("Failed to create model file {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;

        info!(path = %path.display(), model = %self.kind, bytes = bytes.len(), "saved model");
        Ok(())
    }

    /// Read an artifact written by `save`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PipelineError::DataError(format!("Failed to open model {}: {}", path.display(), e))
        })?;

        let mut bytes = Vec::new();
        BufReader::new(file).read_to_end(&mut bytes)?;

        let artifact: Self = bincode::deserialize(&bytes).map_err(|e| {
            PipelineError::SerializationError(format!("Failed to deserialize {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), model = %artifact.kind, "loaded model");
        Ok(artifact)
    }
}

/// Save then immediately reload, returning the reloaded copy
pub fn save_and_reload(artifact: &ModelArtifact, path: impl AsRef<Path>) -> Result<ModelArtifact> {
    artifact.save(&path)?;
    ModelArtifact::load(&path)
}
