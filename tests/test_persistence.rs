//! Integration test: persisted artifacts are self-contained

mod common;

use case_outcome::export::ModelArtifact;
use case_outcome::runs::run_baseline;
use case_outcome::training::{ModelKind, ModelSpec};
use case_outcome::utils::DataLoader;
use common::{age_of, config_in, outcome_of, write_cases};

#[test]
fn test_artifact_encodes_raw_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let eval = run_baseline(&config).unwrap();

    let artifact = ModelArtifact::load(&eval.model_path).unwrap();
    assert_eq!(artifact.kind, ModelKind::DecisionTree);
    assert_eq!(artifact.spec().unwrap(), config.baseline.model);
    assert_eq!(artifact.crate_version, env!("CARGO_PKG_VERSION"));

    // Fresh records drawn from the same vocabularies
    let fresh_dir = tempfile::tempdir().unwrap();
    let df = DataLoader::new().load_csv(write_cases(fresh_dir.path(), 50)).unwrap();
    let encoder = artifact.encoder.as_ref().unwrap();
    let dataset = encoder.transform(&df).unwrap();
    assert_eq!(dataset.feature_names, artifact.feature_names);

    let names = artifact.predict_names(&dataset.features).unwrap();
    let expected: Vec<String> = (0..50).map(|i| outcome_of(age_of(i)).to_string()).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_artifact_predicts_unlabeled_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let eval = run_baseline(&config).unwrap();
    let artifact = ModelArtifact::load(&eval.model_path).unwrap();

    let fresh_dir = tempfile::tempdir().unwrap();
    let labeled = DataLoader::new().load_csv(write_cases(fresh_dir.path(), 30)).unwrap();
    let unlabeled = labeled.drop("outcome").unwrap();

    let names = artifact.predict_records(&unlabeled).unwrap();
    let expected: Vec<String> = (0..30).map(|i| outcome_of(age_of(i)).to_string()).collect();
    assert_eq!(names, expected);

    let features = artifact.encoder.as_ref().unwrap().transform_features(&unlabeled).unwrap();
    let labeled_features = artifact.encoder.as_ref().unwrap().transform(&labeled).unwrap().features;
    assert_eq!(features, labeled_features);
}

#[test]
fn test_reload_predicts_identically() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let eval = run_baseline(&config).unwrap();

    let first = ModelArtifact::load(&eval.model_path).unwrap();
    let copy = dir.path().join("copy").join("model.bin");
    first.save(&copy).unwrap();
    let second = ModelArtifact::load(&copy).unwrap();

    let df = DataLoader::new().load_csv(&config.data_path).unwrap();
    let features = first.encoder.as_ref().unwrap().transform(&df).unwrap().features;
    assert_eq!(first.predict(&features).unwrap(), second.predict(&features).unwrap());
    assert_eq!(first.created_at, second.created_at);
}

#[test]
fn test_spec_mismatch_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let eval = run_baseline(&config).unwrap();
    let artifact = ModelArtifact::load(&eval.model_path).unwrap();

    let result = ModelArtifact::new(
        artifact.model,
        &ModelSpec::new(ModelKind::RandomForest),
        artifact.feature_names,
        artifact.class_names,
    );
    assert!(result.is_err());
}
