//! Utility functions and types

pub mod data_loader;

pub use data_loader::{DataLoader, DataSaver};

use ndarray::{Array1, ArrayView1};
use std::cmp::Ordering;

/// Sorted distinct label values
pub fn unique_classes(y: &Array1<f64>) -> Vec<f64> {
    let mut classes: Vec<f64> = y.to_vec();
    classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    classes.dedup();
    classes
}

/// Position of `value` in `classes`
pub fn class_position(classes: &[f64], value: f64) -> Option<usize> {
    classes.iter().position(|&c| (c - value).abs() < 1e-10)
}

/// Index of the largest value; the first one wins on ties
pub fn argmax(values: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_unique_classes_sorted() {
        let y = array![2.0, 0.0, 1.0, 2.0, 0.0];
        assert_eq!(unique_classes(&y), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_argmax_first_wins() {
        let v = array![0.2, 0.4, 0.4];
        assert_eq!(argmax(v.view()), 1);
    }

    #[test]
    fn test_class_position() {
        assert_eq!(class_position(&[0.0, 1.0, 3.0], 3.0), Some(2));
        assert_eq!(class_position(&[0.0, 1.0], 5.0), None);
    }
}
