//! The three pipeline runs
//!
//! Each run loads the record table, encodes and splits it, fits its models,
//! persists them and reloads them before any evaluation. Results come back as
//! plain structs; printing is left to the CLI.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::evaluation::{classification_report, cross_validate, ClassificationReport};
use crate::export::{save_and_reload, ModelArtifact};
use crate::preprocessing::{prepare_dataset, CaseEncoder, EncodedDataset, SplitConfig, TrainTestSplit};
use crate::training::{self, CVResults, Classifier, GridSearch, HyperParams, ModelSpec, SearchResults, TrainedModel};
use crate::utils::DataLoader;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Evaluation of one persisted-and-reloaded model
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub spec: ModelSpec,
    pub model_path: PathBuf,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub train_report: ClassificationReport,
    pub test_report: ClassificationReport,
}

/// A `train` run model: evaluation plus cross-validated accuracy on the train subset
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub evaluation: ModelEvaluation,
    pub cv: CVResults,
}

#[derive(Debug, Clone)]
pub struct TuneOutcome {
    pub best_params: HyperParams,
    pub best_score: f64,
    pub refit: String,
    pub results: SearchResults,
    pub results_path: PathBuf,
    pub evaluation: ModelEvaluation,
}

struct Prepared {
    encoder: CaseEncoder,
    dataset: EncodedDataset,
    parts: TrainTestSplit,
}

fn load_and_prepare(
    config: &PipelineConfig,
    row_limit: Option<usize>,
    split: &SplitConfig,
) -> Result<Prepared> {
    let mut loader = DataLoader::new();
    if let Some(n) = row_limit {
        loader = loader.with_row_limit(n);
    }
    let df = loader.load_csv(&config.data_path)?;
    let (encoder, dataset, parts, _) = prepare_dataset(&df, &config.encoder, split)?;
    Ok(Prepared {
        encoder,
        dataset,
        parts,
    })
}

/// Wrap, save, reload and score a fitted model
fn persist_and_evaluate(
    config: &PipelineConfig,
    model: TrainedModel,
    spec: &ModelSpec,
    prepared: &Prepared,
    file_stem: &str,
) -> Result<ModelEvaluation> {
    let artifact = ModelArtifact::new(
        model,
        spec,
        prepared.dataset.feature_names.clone(),
        prepared.dataset.class_names.clone(),
    )?
    .with_encoder(prepared.encoder.clone());

    let model_path = config.model_path(file_stem);
    let reloaded = save_and_reload(&artifact, &model_path)?;

    let parts = &prepared.parts;
    let classes = &prepared.dataset.class_names;
    let train_pred = reloaded.predict(&parts.x_train)?;
    let test_pred = reloaded.predict(&parts.x_test)?;

    Ok(ModelEvaluation {
        spec: spec.clone(),
        model_path,
        train_accuracy: reloaded.model.score(&parts.x_train, &parts.y_train)?,
        test_accuracy: reloaded.model.score(&parts.x_test, &parts.y_test)?,
        train_report: classification_report(&parts.y_train, &train_pred, classes)?,
        test_report: classification_report(&parts.y_test, &test_pred, classes)?,
    })
}

/// Fit every configured model on an unstratified split and cross-validate it
pub fn run_train(config: &PipelineConfig) -> Result<Vec<TrainOutcome>> {
    let run = &config.train;
    let prepared = load_and_prepare(config, None, &run.split)?;
    let parts = &prepared.parts;

    run.models
        .iter()
        .map(|spec| {
            let model = training::train(spec, &parts.x_train, &parts.y_train)?;
            let evaluation = persist_and_evaluate(config, model, spec, &prepared, spec.kind.as_str())?;
            let cv = cross_validate(&spec.build()?, &parts.x_train, &parts.y_train, run.cv_folds)?;

            info!(
                model = %spec.kind,
                train_accuracy = evaluation.train_accuracy,
                test_accuracy = evaluation.test_accuracy,
                cv_mean = cv.mean_score,
                "train run model finished"
            );
            Ok(TrainOutcome { evaluation, cv })
        })
        .collect()
}

/// Grid-search the configured model on a row-limited stratified split
pub fn run_tune(config: &PipelineConfig) -> Result<TuneOutcome> {
    let run = &config.tune;
    let prepared = load_and_prepare(config, run.row_limit, &run.split)?;
    let parts = &prepared.parts;

    let start = Instant::now();
    let search = GridSearch::new(run.model.clone(), run.grid.clone())
        .with_scorers(run.scorers.clone())
        .with_refit(run.refit.clone())
        .with_cv_folds(run.cv_folds)
        .fit(&parts.x_train, &parts.y_train, &prepared.dataset.class_names)?;

    search.results.write_csv(&run.results_path)?;
    info!(
        path = %run.results_path.display(),
        best = %search.best_params.describe(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "grid search finished"
    );

    let best_spec = run.model.with_overrides(&search.best_params);
    let stem = format!("{}_tuned", best_spec.kind.as_str());
    let evaluation = persist_and_evaluate(config, search.best_model, &best_spec, &prepared, &stem)?;

    Ok(TuneOutcome {
        best_params: search.best_params,
        best_score: search.best_score,
        refit: run.refit.clone(),
        results: search.results,
        results_path: run.results_path.clone(),
        evaluation,
    })
}

/// Fit the baseline model on a stratified split of the full table
pub fn run_baseline(config: &PipelineConfig) -> Result<ModelEvaluation> {
    let run = &config.baseline;
    let prepared = load_and_prepare(config, None, &run.split)?;
    let parts = &prepared.parts;

    let model = training::train(&run.model, &parts.x_train, &parts.y_train)?;
    let stem = format!("{}_baseline", run.model.kind.as_str());
    persist_and_evaluate(config, model, &run.model, &prepared, &stem)
}
