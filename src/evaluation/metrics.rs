//! Classification metrics

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// How per-class scores are combined into one number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Average {
    /// Pool true positives and counts over the selected classes
    Micro,
    /// Unweighted mean of per-class scores
    Macro,
    /// Mean of per-class scores weighted by true support
    Weighted,
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Average::Micro => write!(f, "micro"),
            Average::Macro => write!(f, "macro"),
            Average::Weighted => write!(f, "weighted"),
        }
    }
}

/// Precision, recall and F1 for one class or one average
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prf {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Prf {
    fn from_counts(tp: usize, predicted: usize, actual: usize) -> Self {
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, actual);
        Self {
            precision,
            recall,
            f1: harmonic(precision, recall),
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn harmonic(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Confusion counts per label
#[derive(Debug, Clone, PartialEq)]
pub struct PerClassScores {
    pub labels: Vec<f64>,
    pub scores: Vec<Prf>,
    /// Rows whose true label is this class
    pub support: Vec<usize>,
    true_positives: Vec<usize>,
    predicted: Vec<usize>,
}

impl PerClassScores {
    /// Count against `labels`, or against every label seen in either vector
    ///
    /// Labels listed but never seen score zero.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>, labels: Option<&[f64]>) -> Result<Self> {
        check_lengths(y_true, y_pred)?;

        let labels: Vec<f64> = match labels {
            Some(given) => given.to_vec(),
            None => {
                let mut seen: Vec<f64> = y_true.iter().chain(y_pred.iter()).copied().collect();
                seen.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                seen.dedup();
                seen
            }
        };

        let n = labels.len();
        let mut true_positives = vec![0; n];
        let mut predicted = vec![0; n];
        let mut support = vec![0; n];
        let position = |v: f64| labels.iter().position(|&l| l == v);

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            if let Some(i) = position(t) {
                support[i] += 1;
                if t == p {
                    true_positives[i] += 1;
                }
            }
            if let Some(j) = position(p) {
                predicted[j] += 1;
            }
        }

        let scores = (0..n)
            .map(|i| Prf::from_counts(true_positives[i], predicted[i], support[i]))
            .collect();

        Ok(Self {
            labels,
            scores,
            support,
            true_positives,
            predicted,
        })
    }

    pub fn total_support(&self) -> usize {
        self.support.iter().sum()
    }

    /// Combine per-class scores
    pub fn average(&self, average: Average) -> Prf {
        if self.labels.is_empty() {
            return Prf { precision: 0.0, recall: 0.0, f1: 0.0 };
        }
        match average {
            Average::Micro => Prf::from_counts(
                self.true_positives.iter().sum(),
                self.predicted.iter().sum(),
                self.total_support(),
            ),
            Average::Macro => {
                let n = self.scores.len() as f64;
                Prf {
                    precision: self.scores.iter().map(|s| s.precision).sum::<f64>() / n,
                    recall: self.scores.iter().map(|s| s.recall).sum::<f64>() / n,
                    f1: self.scores.iter().map(|s| s.f1).sum::<f64>() / n,
                }
            }
            Average::Weighted => {
                let total = self.total_support();
                if total == 0 {
                    return Prf { precision: 0.0, recall: 0.0, f1: 0.0 };
                }
                let weighted = |get: fn(&Prf) -> f64| {
                    self.scores
                        .iter()
                        .zip(self.support.iter())
                        .map(|(s, &w)| get(s) * w as f64)
                        .sum::<f64>()
                        / total as f64
                };
                Prf {
                    precision: weighted(|s| s.precision),
                    recall: weighted(|s| s.recall),
                    f1: weighted(|s| s.f1),
                }
            }
        }
    }
}

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("y_pred length = {}", y_true.len()),
            actual: format!("y_pred length = {}", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(PipelineError::ValidationError("cannot score zero samples".to_string()));
    }
    Ok(())
}

/// Fraction of exact matches
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

pub fn precision_score(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    labels: Option<&[f64]>,
    average: Average,
) -> Result<f64> {
    Ok(PerClassScores::compute(y_true, y_pred, labels)?.average(average).precision)
}

pub fn recall_score(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    labels: Option<&[f64]>,
    average: Average,
) -> Result<f64> {
    Ok(PerClassScores::compute(y_true, y_pred, labels)?.average(average).recall)
}

pub fn f1_score(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    labels: Option<&[f64]>,
    average: Average,
) -> Result<f64> {
    Ok(PerClassScores::compute(y_true, y_pred, labels)?.average(average).f1)
}
