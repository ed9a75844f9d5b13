//! Named scoring functions for model selection

use crate::error::Result;
use crate::training::Classifier;
use super::metrics::{accuracy_score, Average, PerClassScores, Prf};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Underlying metric of a scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    F1,
}

/// A metric with its averaging and optional class subset, under a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorer {
    pub name: String,
    pub metric: Metric,
    #[serde(default = "default_average")]
    pub average: Average,
    /// Class names to restrict to; all classes when absent
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

fn default_average() -> Average {
    Average::Weighted
}

impl Scorer {
    pub fn new(name: impl Into<String>, metric: Metric) -> Self {
        Self {
            name: name.into(),
            metric,
            average: Average::Weighted,
            labels: None,
        }
    }

    pub fn accuracy(name: impl Into<String>) -> Self {
        Self::new(name, Metric::Accuracy)
    }

    pub fn with_average(mut self, average: Average) -> Self {
        self.average = average;
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = Some(labels.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Class codes for the configured names; unknown names map to -1 and never match
    fn label_codes(&self, class_names: &[String]) -> Option<Vec<f64>> {
        self.labels.as_ref().map(|names| {
            names
                .iter()
                .map(|name| match class_names.iter().position(|c| c == name) {
                    Some(code) => code as f64,
                    None => {
                        warn!(scorer = %self.name, label = %name, "scorer label is not a known class");
                        -1.0
                    }
                })
                .collect()
        })
    }

    /// Score predictions against truth
    pub fn evaluate(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>, class_names: &[String]) -> Result<f64> {
        let averaged = || -> Result<Prf> {
            let codes = self.label_codes(class_names);
            Ok(PerClassScores::compute(y_true, y_pred, codes.as_deref())?.average(self.average))
        };
        match self.metric {
            Metric::Accuracy => accuracy_score(y_true, y_pred),
            Metric::Precision => Ok(averaged()?.precision),
            Metric::Recall => Ok(averaged()?.recall),
            Metric::F1 => Ok(averaged()?.f1),
        }
    }

    /// Predict with `model` and score the result
    pub fn score<M: Classifier + ?Sized>(
        &self,
        model: &M,
        x: &Array2<f64>,
        y: &Array1<f64>,
        class_names: &[String],
    ) -> Result<f64> {
        let predictions = model.predict(x)?;
        self.evaluate(y, &predictions, class_names)
    }
}

/// The four scorers used when tuning for the deceased class
pub fn deceased_scorers() -> Vec<Scorer> {
    vec![
        Scorer::new("f1_score_on_deceased", Metric::F1)
            .with_average(Average::Weighted)
            .with_labels(&["deceased"]),
        Scorer::new("recall_on_deceased", Metric::Recall)
            .with_average(Average::Micro)
            .with_labels(&["deceased"]),
        Scorer::accuracy("overall_accuracy"),
        Scorer::new("overall_recall", Metric::Recall).with_average(Average::Weighted),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names() -> Vec<String> {
        vec!["deceased".to_string(), "hospitalized".to_string(), "recovered".to_string()]
    }

    #[test]
    fn test_deceased_scorers() {
        let y_true = array![0.0, 0.0, 0.0, 0.0, 2.0, 2.0, 1.0, 1.0];
        let y_pred = array![0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 1.0, 1.0];
        let scorers = deceased_scorers();
        let scores: Vec<f64> = scorers
            .iter()
            .map(|s| s.evaluate(&y_true, &y_pred, &names()).unwrap())
            .collect();

        // deceased: tp 3, predicted 4, actual 4
        assert!((scores[0] - 0.75).abs() < 1e-12);
        assert!((scores[1] - 0.75).abs() < 1e-12);
        assert!((scores[2] - 6.0 / 8.0).abs() < 1e-12);
        // weighted recall equals accuracy
        assert!((scores[3] - scores[2]).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_label_scores_zero() {
        let y = array![0.0, 1.0];
        let scorer = Scorer::new("f1_missing", Metric::F1).with_labels(&["unknown"]);
        assert_eq!(scorer.evaluate(&y, &y, &names()).unwrap(), 0.0);
    }

    #[test]
    fn test_scorer_from_json() {
        let scorer: Scorer = serde_json::from_str(
            r#"{"name": "recall_on_deceased", "metric": "recall", "average": "micro", "labels": ["deceased"]}"#,
        )
        .unwrap();
        assert_eq!(scorer, deceased_scorers()[1]);

        let minimal: Scorer = serde_json::from_str(r#"{"name": "acc", "metric": "accuracy"}"#).unwrap();
        assert_eq!(minimal.average, Average::Weighted);
        assert!(minimal.labels.is_none());
    }
}
