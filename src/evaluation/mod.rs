//! Model evaluation
//!
//! Accuracy, per-class precision/recall/F1, named scorers and
//! cross-validated scoring of unfitted model templates.

mod metrics;
mod report;
mod scoring;

pub use metrics::{accuracy_score, f1_score, precision_score, recall_score, Average, PerClassScores, Prf};
pub use report::{classification_report, ClassificationReport, ReportRow};
pub use scoring::{deceased_scorers, Metric, Scorer};

use crate::error::Result;
use crate::training::{CVResults, Classifier, CrossValidator};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Accuracy of a fitted model
pub fn score<M: Classifier + ?Sized>(model: &M, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
    model.score(x, y)
}

/// Timings and scorer results for one fold
#[derive(Debug, Clone)]
pub struct FoldEvaluation {
    pub fit_time_secs: f64,
    pub score_time_secs: f64,
    /// One entry per scorer, in scorer order
    pub scores: Vec<f64>,
}

/// Fit a fresh clone of `template` on every training fold and score it on the held-out fold
pub fn evaluate_folds<M>(
    template: &M,
    x: &Array2<f64>,
    y: &Array1<f64>,
    cv: &CrossValidator,
    scorers: &[Scorer],
    class_names: &[String],
) -> Result<Vec<FoldEvaluation>>
where
    M: Classifier + Clone,
{
    let splits = cv.split(x.nrows(), Some(y))?;

    splits
        .par_iter()
        .map(|split| {
            let x_train = x.select(Axis(0), &split.train_indices);
            let y_train = y.select(Axis(0), &split.train_indices);
            let x_test = x.select(Axis(0), &split.test_indices);
            let y_test = y.select(Axis(0), &split.test_indices);

            let mut model = template.clone();
            let start = Instant::now();
            model.fit(&x_train, &y_train)?;
            let fit_time_secs = start.elapsed().as_secs_f64();

            let start = Instant::now();
            let predictions = model.predict(&x_test)?;
            let scores = scorers
                .iter()
                .map(|scorer| scorer.evaluate(&y_test, &predictions, class_names))
                .collect::<Result<Vec<f64>>>()?;
            let score_time_secs = start.elapsed().as_secs_f64();

            debug!(fold = split.fold_idx, ?scores, "evaluated fold");

            Ok(FoldEvaluation {
                fit_time_secs,
                score_time_secs,
                scores,
            })
        })
        .collect()
}

/// Accuracy per stratified, unshuffled fold
pub fn cross_validate<M>(template: &M, x: &Array2<f64>, y: &Array1<f64>, n_folds: usize) -> Result<CVResults>
where
    M: Classifier + Clone,
{
    let scorers = [Scorer::accuracy("accuracy")];
    let folds = evaluate_folds(template, x, y, &CrossValidator::stratified(n_folds), &scorers, &[])?;
    let results = CVResults::from_scores(folds.iter().map(|f| f.scores[0]).collect());

    info!(
        folds = results.n_folds,
        mean = results.mean_score,
        std = results.std_score,
        "cross-validation finished"
    );

    Ok(results)
}
