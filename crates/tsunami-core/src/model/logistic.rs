//! Binary logistic regression with an optional standard scaler.
//!
//! `P(class 1) = σ(w · x' + b)` where `x' = (x - mean) / scale` when a scaler
//! is present. Linear models carry no feature importances.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    scaler: Option<Scaler>,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64, scaler: Option<Scaler>) -> Result<Self> {
        let n = coefficients.len();
        if n == 0 {
            return Err(invalid("no coefficients"));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(invalid("non-finite coefficient"));
        }
        if let Some(s) = &scaler {
            if s.mean.len() != n || s.scale.len() != n {
                return Err(invalid(format!(
                    "scaler has {}/{} entries for {n} coefficients",
                    s.mean.len(),
                    s.scale.len()
                )));
            }
            if s.scale.iter().any(|v| !v.is_finite() || *v == 0.0) || s.mean.iter().any(|m| !m.is_finite()) {
                return Err(invalid("scaler has a zero or non-finite entry"));
            }
        }
        Ok(Self { coefficients, intercept, scaler })
    }

    pub fn decision_function(&self, row: &[f64]) -> f64 {
        let dot: f64 = match &self.scaler {
            Some(s) => row
                .iter()
                .zip(&self.coefficients)
                .zip(s.mean.iter().zip(&s.scale))
                .map(|((x, w), (m, sd))| w * (x - m) / sd)
                .sum(),
            None => row.iter().zip(&self.coefficients).map(|(x, w)| w * x).sum(),
        };
        dot + self.intercept
    }

    /// `[P(class 0), P(class 1)]`.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let p1 = sigmoid(self.decision_function(row));
        vec![1.0 - p1, p1]
    }
}

/// Logistic function, stable for large |z|.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::InvalidEstimator(msg.into())
}
