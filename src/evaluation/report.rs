//! Per-class classification report

use crate::error::Result;
use super::metrics::{accuracy_score, Average, PerClassScores, Prf};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ReportRow {
    fn new(name: impl Into<String>, prf: Prf, support: usize) -> Self {
        Self {
            name: name.into(),
            precision: prf.precision,
            recall: prf.recall,
            f1: prf.f1,
            support,
        }
    }
}

/// Precision, recall, F1 and support per class plus accuracy and averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ReportRow>,
    pub accuracy: f64,
    pub macro_avg: ReportRow,
    pub weighted_avg: ReportRow,
    /// Decimal places when rendered
    pub digits: usize,
}

/// Build a report over every label present in either vector
///
/// Label codes index into `class_names`; a code without a name is shown as
/// the number itself.
pub fn classification_report(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    class_names: &[String],
) -> Result<ClassificationReport> {
    let per_class = PerClassScores::compute(y_true, y_pred, None)?;
    let total = per_class.total_support();

    let classes = per_class
        .labels
        .iter()
        .zip(per_class.scores.iter())
        .zip(per_class.support.iter())
        .map(|((&label, &prf), &support)| {
            let name = if label >= 0.0 && label.fract() == 0.0 {
                class_names.get(label as usize).cloned()
            } else {
                None
            };
            ReportRow::new(name.unwrap_or_else(|| label.to_string()), prf, support)
        })
        .collect();

    Ok(ClassificationReport {
        classes,
        accuracy: accuracy_score(y_true, y_pred)?,
        macro_avg: ReportRow::new("macro avg", per_class.average(Average::Macro), total),
        weighted_avg: ReportRow::new("weighted avg", per_class.average(Average::Weighted), total),
        digits: 2,
    })
}

impl ClassificationReport {
    pub fn with_digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }

    pub fn row(&self, name: &str) -> Option<&ReportRow> {
        self.classes.iter().find(|r| r.name == name)
    }

    fn write_row(&self, f: &mut fmt::Formatter<'_>, row: &ReportRow, width: usize) -> fmt::Result {
        let d = self.digits;
        writeln!(
            f,
            "{:>width$}  {:>9.d$} {:>9.d$} {:>9.d$} {:>9}",
            row.name,
            row.precision,
            row.recall,
            row.f1,
            row.support,
            width = width,
            d = d
        )
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|r| r.name.len())
            .chain(std::iter::once(self.weighted_avg.name.len()))
            .max()
            .unwrap_or(0)
            .max(self.digits);

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            width = width
        )?;
        writeln!(f)?;

        for row in &self.classes {
            self.write_row(f, row, width)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.d$} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.weighted_avg.support,
            width = width,
            d = self.digits
        )?;
        self.write_row(f, &self.macro_avg, width)?;
        self.write_row(f, &self.weighted_avg, width)
    }
}
