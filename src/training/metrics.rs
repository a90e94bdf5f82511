//! Classification evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Evaluation report for a fitted classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Exact-match rate on the evaluation set
    pub accuracy: f64,
    /// F1 score averaged over classes, weighted by class support
    pub f1_weighted: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl ClassificationReport {
    /// Compute accuracy and weighted F1 from true and predicted labels.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len();
        if n == 0 {
            return Self { accuracy: 0.0, f1_weighted: 0.0, n_samples: 0 };
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 0.5)
            .count();
        let accuracy = correct as f64 / n as f64;

        // Per-class confusion counts over the union of observed labels
        let mut labels: Vec<i64> = y_true
            .iter()
            .chain(y_pred.iter())
            .map(|v| v.round() as i64)
            .collect();
        labels.sort_unstable();
        labels.dedup();

        let mut f1_weighted = 0.0;
        for &label in &labels {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            let mut support = 0usize;

            for (t, p) in y_true.iter().zip(y_pred.iter()) {
                let t_is = t.round() as i64 == label;
                let p_is = p.round() as i64 == label;
                if t_is {
                    support += 1;
                }
                match (t_is, p_is) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }

            let precision = if tp + fp > 0 { tp as f64 / (tp + fp) as f64 } else { 0.0 };
            let recall = if tp + fn_ > 0 { tp as f64 / (tp + fn_) as f64 } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            f1_weighted += f1 * support as f64 / n as f64;
        }

        Self { accuracy, f1_weighted, n_samples: n }
    }

    /// Metric map recorded with the run: at least `accuracy` and `f1_score`.
    pub fn to_metric_map(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert("accuracy".to_string(), self.accuracy);
        metrics.insert("f1_score".to_string(), self.f1_weighted);
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let y = array![0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let report = ClassificationReport::compute(&y, &y);
        assert_eq!(report.accuracy, 1.0);
        assert!((report.f1_weighted - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_confusion() {
        // Two classes, balanced: class 0 gets 2/3 right, class 1 all right
        let y_true = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let y_pred = array![0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let report = ClassificationReport::compute(&y_true, &y_pred);
        assert!((report.accuracy - 5.0 / 6.0).abs() < 1e-12);

        // class 0: p=1.0, r=2/3, f1=0.8; class 1: p=3/4, r=1.0, f1=6/7
        let expected = 0.8 * 0.5 + (6.0 / 7.0) * 0.5;
        assert!((report.f1_weighted - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let y: Array1<f64> = array![];
        let report = ClassificationReport::compute(&y, &y);
        assert_eq!(report.n_samples, 0);
        assert_eq!(report.accuracy, 0.0);
    }

    #[test]
    fn test_metric_map_keys() {
        let y = array![0.0, 1.0];
        let report = ClassificationReport::compute(&y, &y);
        let map = report.to_metric_map();
        assert!(map.contains_key("accuracy"));
        assert!(map.contains_key("f1_score"));
    }
}
