//! Exhaustive hyperparameter search with cross-validated scoring

use crate::error::{PipelineError, Result};
use crate::evaluation::{evaluate_folds, FoldEvaluation, Scorer};
use crate::utils::DataSaver;
use super::cross_validation::CrossValidator;
use super::models::{Classifier, ModelSpec, TrainedModel};
use super::params::{HyperParams, ParamGrid};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Grid search over one model family
#[derive(Debug, Clone)]
pub struct GridSearch {
    base: ModelSpec,
    grid: ParamGrid,
    scorers: Vec<Scorer>,
    refit: Option<String>,
    cv: CrossValidator,
}

/// Cross-validated results of one parameter combination
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub params: HyperParams,
    pub mean_fit_time: f64,
    pub std_fit_time: f64,
    pub mean_score_time: f64,
    /// Per scorer, in scorer order
    pub mean_test: Vec<f64>,
    pub std_test: Vec<f64>,
    pub rank_test: Vec<u32>,
}

/// Results table of a search, one candidate per grid combination
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub param_names: Vec<String>,
    pub scorer_names: Vec<String>,
    pub candidates: Vec<CandidateResult>,
}

/// Outcome of `GridSearch::fit`
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_index: usize,
    pub best_params: HyperParams,
    /// Mean cross-validated score of the refit scorer
    pub best_score: f64,
    /// Best combination refit on all data
    pub best_model: TrainedModel,
    pub refit_time_secs: f64,
    pub results: SearchResults,
}

impl GridSearch {
    /// Search `grid` on top of the fixed parameters in `base`
    pub fn new(base: ModelSpec, grid: ParamGrid) -> Self {
        Self {
            base,
            grid,
            scorers: vec![Scorer::accuracy("accuracy")],
            refit: None,
            cv: CrossValidator::stratified(5),
        }
    }

    pub fn with_scorers(mut self, scorers: Vec<Scorer>) -> Self {
        self.scorers = scorers;
        self
    }

    /// Scorer that picks the best combination; the first scorer by default
    pub fn with_refit(mut self, scorer_name: impl Into<String>) -> Self {
        self.refit = Some(scorer_name.into());
        self
    }

    /// Stratified, unshuffled folds
    pub fn with_cv_folds(mut self, n_folds: usize) -> Self {
        self.cv = CrossValidator::stratified(n_folds);
        self
    }

    pub fn with_cv(mut self, cv: CrossValidator) -> Self {
        self.cv = cv;
        self
    }

    fn refit_index(&self) -> Result<usize> {
        match &self.refit {
            None => Ok(0),
            Some(name) => self.scorers.iter().position(|s| &s.name == name).ok_or_else(|| {
                PipelineError::ConfigError(format!("refit scorer '{}' is not among the scorers", name))
            }),
        }
    }

    /// Evaluate every combination, then refit the best one on all of `x`
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>, class_names: &[String]) -> Result<GridSearchResult> {
        if self.scorers.is_empty() {
            return Err(PipelineError::ConfigError("grid search needs at least one scorer".to_string()));
        }
        let refit_idx = self.refit_index()?;
        let combinations = self.grid.combinations();
        if combinations.is_empty() {
            return Err(PipelineError::ConfigError("parameter grid is empty".to_string()));
        }

        info!(
            model = %self.base.kind,
            candidates = combinations.len(),
            folds = self.cv.strategy().n_splits(),
            "starting grid search"
        );

        let evaluations: Vec<Vec<FoldEvaluation>> = combinations
            .par_iter()
            .map(|params| {
                let template = self.base.with_overrides(params).build()?;
                let folds = evaluate_folds(&template, x, y, &self.cv, &self.scorers, class_names)?;
                debug!(params = %params.describe(), "evaluated candidate");
                Ok(folds)
            })
            .collect::<Result<_>>()?;

        let mut candidates: Vec<CandidateResult> = combinations
            .into_iter()
            .zip(evaluations.iter())
            .map(|(params, folds)| summarize(params, folds, self.scorers.len()))
            .collect();

        for s in 0..self.scorers.len() {
            let means: Vec<f64> = candidates.iter().map(|c| c.mean_test[s]).collect();
            for (candidate, rank) in candidates.iter_mut().zip(min_ranks(&means)) {
                candidate.rank_test.push(rank);
            }
        }

        let best_index = candidates
            .iter()
            .position(|c| c.rank_test[refit_idx] == 1)
            .unwrap_or(0);
        let best_params = candidates[best_index].params.clone();
        let best_score = candidates[best_index].mean_test[refit_idx];

        let start = Instant::now();
        let mut best_model = self.base.with_overrides(&best_params).build()?;
        best_model.fit(x, y)?;
        let refit_time_secs = start.elapsed().as_secs_f64();

        info!(
            best_params = %best_params.describe(),
            scorer = %self.scorers[refit_idx].name,
            best_score,
            "grid search finished"
        );

        Ok(GridSearchResult {
            best_index,
            best_params,
            best_score,
            best_model,
            refit_time_secs,
            results: SearchResults {
                param_names: self.grid.param_names(),
                scorer_names: self.scorers.iter().map(|s| s.name.clone()).collect(),
                candidates,
            },
        })
    }
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len().max(1) as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn summarize(params: HyperParams, folds: &[FoldEvaluation], n_scorers: usize) -> CandidateResult {
    let fit_times: Vec<f64> = folds.iter().map(|f| f.fit_time_secs).collect();
    let score_times: Vec<f64> = folds.iter().map(|f| f.score_time_secs).collect();
    let (mean_fit_time, std_fit_time) = mean_std(&fit_times);
    let (mean_score_time, _) = mean_std(&score_times);

    let (mean_test, std_test) = (0..n_scorers)
        .map(|s| {
            let per_fold: Vec<f64> = folds.iter().map(|f| f.scores[s]).collect();
            mean_std(&per_fold)
        })
        .unzip();

    CandidateResult {
        params,
        mean_fit_time,
        std_fit_time,
        mean_score_time,
        mean_test,
        std_test,
        rank_test: Vec::with_capacity(n_scorers),
    }
}

/// Rank 1 is the highest score; tied scores share the smallest rank
fn min_ranks(scores: &[f64]) -> Vec<u32> {
    scores
        .iter()
        .map(|&s| 1 + scores.iter().filter(|&&other| other > s).count() as u32)
        .collect()
}

impl SearchResults {
    /// Columns: timings, `param_<name>`, `params`, then mean/std/rank per scorer
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = vec![
            Column::new(
                "mean_fit_time".into(),
                self.candidates.iter().map(|c| c.mean_fit_time).collect::<Vec<f64>>(),
            ),
            Column::new(
                "std_fit_time".into(),
                self.candidates.iter().map(|c| c.std_fit_time).collect::<Vec<f64>>(),
            ),
            Column::new(
                "mean_score_time".into(),
                self.candidates.iter().map(|c| c.mean_score_time).collect::<Vec<f64>>(),
            ),
        ];

        for name in &self.param_names {
            let values: Vec<String> = self
                .candidates
                .iter()
                .map(|c| c.params.get(name).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            columns.push(Column::new(format!("param_{}", name).into(), values));
        }
        columns.push(Column::new(
            "params".into(),
            self.candidates.iter().map(|c| c.params.describe()).collect::<Vec<String>>(),
        ));

        for (s, scorer) in self.scorer_names.iter().enumerate() {
            columns.push(Column::new(
                format!("mean_test_{}", scorer).into(),
                self.candidates.iter().map(|c| c.mean_test[s]).collect::<Vec<f64>>(),
            ));
            columns.push(Column::new(
                format!("std_test_{}", scorer).into(),
                self.candidates.iter().map(|c| c.std_test[s]).collect::<Vec<f64>>(),
            ));
            columns.push(Column::new(
                format!("rank_test_{}", scorer).into(),
                self.candidates.iter().map(|c| c.rank_test[s]).collect::<Vec<u32>>(),
            ));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Write the results table as CSV, creating parent directories
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut df = self.to_dataframe()?;
        DataSaver::save_csv(&mut df, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{Average, Metric};
    use crate::training::ModelKind;

    fn bands() -> (Array2<f64>, Array1<f64>, Vec<String>) {
        let n = 60;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { (i % 3) as f64 * 5.0 + (i % 7) as f64 * 0.1 } else { (i % 5) as f64 });
        let y = Array1::from_iter((0..n).map(|i| (i % 3) as f64));
        let names = vec!["deceased".to_string(), "hospitalized".to_string(), "recovered".to_string()];
        (x, y, names)
    }

    fn adaboost_search() -> GridSearch {
        let base = ModelSpec::new(ModelKind::AdaBoost)
            .with_params(HyperParams::new().with("random_state", 0i64));
        let grid = ParamGrid::new()
            .with("n_estimators", vec![10i64.into()])
            .with("learning_rate", vec![1i64.into(), 0.5.into(), 0.1.into()])
            .with("algorithm", vec!["SAMME".into(), "SAMME.R".into()]);
        GridSearch::new(base, grid)
            .with_scorers(vec![
                Scorer::new("f1_score_on_deceased", Metric::F1).with_labels(&["deceased"]),
                Scorer::accuracy("overall_accuracy"),
            ])
            .with_refit("f1_score_on_deceased")
            .with_cv_folds(3)
    }

    #[test]
    fn test_min_ranks() {
        assert_eq!(min_ranks(&[0.5, 0.9, 0.5, 0.1]), vec![2, 1, 2, 4]);
        assert_eq!(min_ranks(&[0.7, 0.7]), vec![1, 1]);
    }

    #[test]
    fn test_grid_search_results_table() {
        let (x, y, names) = bands();
        let result = adaboost_search().fit(&x, &y, &names).unwrap();

        assert_eq!(result.results.candidates.len(), 6);
        assert!(result.best_model.is_fitted());
        assert_eq!(result.results.candidates[result.best_index].rank_test[0], 1);

        let df = result.results.to_dataframe().unwrap();
        assert_eq!(df.height(), 6);
        for column in [
            "mean_fit_time",
            "param_algorithm",
            "param_learning_rate",
            "param_n_estimators",
            "mean_test_f1_score_on_deceased",
            "rank_test_f1_score_on_deceased",
            "mean_test_overall_accuracy",
            "rank_test_overall_accuracy",
        ] {
            assert!(df.column(column).is_ok(), "missing column {}", column);
        }
    }

    #[test]
    fn test_best_params_come_from_grid() {
        let (x, y, names) = bands();
        let result = adaboost_search().fit(&x, &y, &names).unwrap();
        assert_eq!(result.best_params.usize("n_estimators").unwrap(), Some(10));
        assert!(result.best_params.text("algorithm").unwrap().is_some());
    }

    #[test]
    fn test_unknown_refit_scorer() {
        let (x, y, names) = bands();
        let search = adaboost_search().with_refit("missing");
        assert!(matches!(search.fit(&x, &y, &names), Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_grid_value_propagates() {
        let (x, y, names) = bands();
        let grid = ParamGrid::new().with("max_depth", vec![2i64.into()]);
        let search = GridSearch::new(ModelSpec::new(ModelKind::AdaBoost), grid)
            .with_scorers(vec![Scorer::new("recall", Metric::Recall).with_average(Average::Macro)]);
        assert!(search.fit(&x, &y, &names).is_err());
    }

    #[test]
    fn test_write_csv() {
        let (x, y, names) = bands();
        let result = adaboost_search().fit(&x, &y, &names).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("tuning.csv");
        result.results.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert!(header.starts_with("mean_fit_time"));
        assert!(header.contains("rank_test_overall_accuracy"));
        assert_eq!(content.lines().count(), 7);
    }
}
