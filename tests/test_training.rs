//! Integration test: the train, tune and baseline runs end-to-end

mod common;

use case_outcome::runs::{run_baseline, run_train, run_tune};
use case_outcome::training::{Classifier, ModelKind, ParamValue};
use case_outcome::utils::DataLoader;
use common::config_in;

#[test]
fn test_train_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let outcomes = run_train(&config).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].evaluation.spec.kind, ModelKind::AdaBoost);
    assert_eq!(outcomes[1].evaluation.spec.kind, ModelKind::RandomForest);

    for outcome in &outcomes {
        let eval = &outcome.evaluation;
        assert!(eval.model_path.is_file());
        assert!((0.0..=1.0).contains(&eval.train_accuracy));
        assert!((0.0..=1.0).contains(&eval.test_accuracy));
        assert_eq!(eval.train_report.accuracy, eval.train_accuracy);
        assert_eq!(eval.test_report.macro_avg.support, 80);

        assert_eq!(outcome.cv.n_folds, 10);
        assert_eq!(outcome.cv.scores.len(), 10);
        assert!(outcome.cv.scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    assert!(dir.path().join("models").join("adaboost.bin").is_file());
    assert!(dir.path().join("models").join("random_forest.bin").is_file());
}

#[test]
fn test_train_run_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let first = run_train(&config).unwrap();
    let second = run_train(&config).unwrap();
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.evaluation.test_accuracy, b.evaluation.test_accuracy);
        assert_eq!(a.cv.scores, b.cv.scores);
    }
}

#[test]
fn test_tune_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let outcome = run_tune(&config).unwrap();
    assert_eq!(outcome.results.candidates.len(), 6);
    assert_eq!(outcome.refit, "f1_score_on_deceased");
    assert!((0.0..=1.0).contains(&outcome.best_score));
    assert_eq!(outcome.best_params.get("n_estimators"), Some(&ParamValue::Int(10)));
    assert!(outcome.best_params.get("algorithm").is_some());

    // 400 rows limit, 20% held out
    assert_eq!(outcome.evaluation.test_report.macro_avg.support, 80);
    assert!(outcome.evaluation.model_path.ends_with("adaboost_tuned.bin"));

    let table = DataLoader::new().load_csv(&outcome.results_path).unwrap();
    assert_eq!(table.height(), 6);
    for column in [
        "mean_fit_time",
        "param_algorithm",
        "param_learning_rate",
        "param_n_estimators",
        "mean_test_f1_score_on_deceased",
        "rank_test_f1_score_on_deceased",
        "mean_test_overall_accuracy",
        "rank_test_recall_on_deceased",
        "rank_test_overall_recall",
    ] {
        assert!(table.column(column).is_ok(), "missing column {}", column);
    }
}

#[test]
fn test_baseline_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let eval = run_baseline(&config).unwrap();
    assert_eq!(eval.spec.kind, ModelKind::DecisionTree);
    assert!(eval.model_path.ends_with("decision_tree_baseline.bin"));

    // Outcome is a step function of age, which a depth-5 tree captures exactly
    assert_eq!(eval.train_accuracy, 1.0);
    assert_eq!(eval.test_accuracy, 1.0);
    let deceased = eval.test_report.row("deceased").unwrap();
    assert_eq!(deceased.f1, 1.0);
}

#[test]
fn test_missing_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path()).with_data_path(dir.path().join("absent.csv"));
    assert!(run_baseline(&config).is_err());
}

#[test]
fn test_reloaded_model_scores_like_fitted() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let eval = run_baseline(&config).unwrap();

    let artifact = case_outcome::export::ModelArtifact::load(&eval.model_path).unwrap();
    assert!(artifact.model.is_fitted());
    assert_eq!(artifact.model.classes().len(), 3);
}
