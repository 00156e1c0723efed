//! Random forest: mean of per-tree leaf probabilities.
//!
//! With the `threading` feature the trees are evaluated on the rayon pool.

#[cfg(feature = "threading")]
use rayon::prelude::*;

use super::tree::DecisionTree;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
    importances: Option<Vec<f64>>,
}

impl RandomForest {
    /// Build a forest from validated trees. `importances`, when present, must
    /// hold one finite, non-negative weight per feature.
    pub fn from_trees(trees: Vec<DecisionTree>, importances: Option<Vec<f64>>) -> Result<Self> {
        let Some(first) = trees.first() else {
            return Err(ModelError::InvalidEstimator("empty forest".into()));
        };
        let (n_features, n_classes) = (first.n_features(), first.n_classes());
        if trees.iter().any(|t| t.n_features() != n_features || t.n_classes() != n_classes) {
            return Err(ModelError::InvalidEstimator("trees disagree on feature or class count".into()));
        }
        if let Some(imp) = &importances {
            if imp.len() != n_features {
                return Err(ModelError::InvalidEstimator(format!(
                    "{} feature importances for {n_features} features",
                    imp.len()
                )));
            }
            if imp.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ModelError::InvalidEstimator("negative or non-finite feature importance".into()));
            }
        }
        Ok(Self { trees, n_classes, importances })
    }

    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut sum = self.summed_proba(row);
        let n = self.trees.len() as f64;
        for p in &mut sum {
            *p /= n;
        }
        sum
    }

    #[cfg(not(feature = "threading"))]
    fn summed_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            add_into(&mut sum, tree.predict_proba(row));
        }
        sum
    }

    #[cfg(feature = "threading")]
    fn summed_proba(&self, row: &[f64]) -> Vec<f64> {
        let n_classes = self.n_classes;
        self.trees
            .par_iter()
            .fold(
                || vec![0.0; n_classes],
                |mut acc, tree| {
                    add_into(&mut acc, tree.predict_proba(row));
                    acc
                },
            )
            .reduce(
                || vec![0.0; n_classes],
                |mut a, b| {
                    add_into(&mut a, &b);
                    a
                },
            )
    }

    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}

fn add_into(acc: &mut [f64], p: &[f64]) {
    for (a, v) in acc.iter_mut().zip(p) {
        *a += v;
    }
}
