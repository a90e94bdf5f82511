//! Multinomial logistic regression (softmax classifier)

use crate::error::{IrisError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Softmax regression for multi-class classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    /// Fitted weights, `n_features x n_classes`
    pub weights: Option<Array2<f64>>,
    /// Fitted per-class intercepts
    pub intercept: Option<Array1<f64>>,
    /// Number of classes seen at fit time
    pub n_classes: usize,
    /// L2 regularization strength
    pub alpha: f64,
    /// Maximum gradient-descent iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    /// Whether the model is fitted
    pub is_fitted: bool,
}

impl Default for SoftmaxRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftmaxRegression {
    /// Create a new softmax regression model
    pub fn new() -> Self {
        Self {
            weights: None,
            intercept: None,
            n_classes: 0,
            alpha: 0.01,
            max_iter: 200,
            tol: 1e-6,
            learning_rate: 0.1,
            is_fitted: false,
        }
    }

    /// Set regularization strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Row-wise softmax with max-subtraction for numerical stability
    fn softmax(logits: &Array2<f64>) -> Array2<f64> {
        let mut out = logits.clone();
        for mut row in out.rows_mut() {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            if sum > 0.0 {
                row.mapv_inplace(|v| v / sum);
            }
        }
        out
    }

    /// Fit the model using batch gradient descent
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(IrisError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(IrisError::TrainingError("empty training set".to_string()));
        }

        let n_classes = y
            .iter()
            .map(|v| v.round() as i64)
            .max()
            .unwrap_or(0)
            .max(0) as usize
            + 1;

        // One-hot encode the labels
        let mut onehot = Array2::zeros((n_samples, n_classes));
        for (i, &label) in y.iter().enumerate() {
            let class = label.round() as i64;
            if class < 0 || class as usize >= n_classes {
                return Err(IrisError::TrainingError(format!(
                    "label {} out of range for {} classes",
                    label, n_classes
                )));
            }
            onehot[[i, class as usize]] = 1.0;
        }

        let mut weights: Array2<f64> = Array2::zeros((n_features, n_classes));
        let mut bias: Array1<f64> = Array1::zeros(n_classes);

        let lr = self.learning_rate;
        let alpha = self.alpha;

        for _iter in 0..self.max_iter {
            let logits = x.dot(&weights) + &bias;
            let probs = Self::softmax(&logits);

            let errors = &probs - &onehot;
            let dw = x.t().dot(&errors) / n_samples as f64 + alpha * &weights;
            let db = errors
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(n_classes));

            let grad_norm =
                (dw.mapv(|v| v * v).sum() + db.mapv(|v| v * v).sum()).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * dw;
            bias = bias - lr * db;
        }

        self.weights = Some(weights);
        self.intercept = Some(bias);
        self.n_classes = n_classes;
        self.is_fitted = true;

        Ok(self)
    }

    /// Predict class probabilities, `n_samples x n_classes`
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(IrisError::ModelNotFitted);
        }

        let weights = self.weights.as_ref().ok_or(IrisError::ModelNotFitted)?;
        let intercept = self.intercept.as_ref().ok_or(IrisError::ModelNotFitted)?;

        let logits = x.dot(weights) + intercept;
        Ok(Self::softmax(&logits))
    }

    /// Predict class labels (argmax over class probabilities)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;

        let predictions: Vec<f64> = proba
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(i, _)| i as f64)
                    .unwrap_or(0.0)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}
