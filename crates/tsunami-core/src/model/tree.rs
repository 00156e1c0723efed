//! Decision tree inference over parallel node arrays.
//!
//! Trees are exported from the training side as parallel arrays, one entry per
//! node: split feature, split threshold, child indices (`-1` on leaves) and the
//! per-class sample weights reaching the node. Samples with
//! `x[feature] <= threshold` go left.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Serialized form of one tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i32>,
    pub children_right: Vec<i32>,
    pub feature: Vec<i32>,
    pub threshold: Vec<f64>,
    /// Per-node class weights; only leaf rows are used.
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    /// Normalized class probabilities.
    Leaf(Vec<f64>),
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTree {
    /// Validate and build a tree.
    ///
    /// Every child index must point past its parent, which rules out cycles and
    /// guarantees traversal terminates.
    pub fn from_spec(spec: &TreeSpec, n_features: usize, n_classes: usize) -> Result<Self> {
        let n = spec.children_left.len();
        if n == 0 {
            return Err(invalid("tree has no nodes"));
        }
        if spec.children_right.len() != n
            || spec.feature.len() != n
            || spec.threshold.len() != n
            || spec.value.len() != n
        {
            return Err(invalid("inconsistent node array lengths"));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (spec.children_left[i], spec.children_right[i]);
            let node = if left < 0 && right < 0 {
                Node::Leaf(leaf_probabilities(&spec.value[i], n_classes, i)?)
            } else {
                let child = |c: i32| -> Result<usize> {
                    match usize::try_from(c) {
                        Ok(c) if c > i && c < n => Ok(c),
                        _ => Err(invalid(format!("node {i} has invalid child index {c}"))),
                    }
                };
                let feature = match usize::try_from(spec.feature[i]) {
                    Ok(f) if f < n_features => f,
                    _ => return Err(invalid(format!("node {i} splits on unknown feature {}", spec.feature[i]))),
                };
                if !spec.threshold[i].is_finite() {
                    return Err(invalid(format!("node {i} has a non-finite threshold")));
                }
                Node::Split { feature, threshold: spec.threshold[i], left: child(left)?, right: child(right)? }
            };
            nodes.push(node);
        }

        Ok(Self { nodes, n_features, n_classes })
    }

    /// Class probabilities of the leaf reached by `row`.
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(proba) => return proba,
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

/// Index of the largest value; the lowest index wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn leaf_probabilities(weights: &[f64], n_classes: usize, node: usize) -> Result<Vec<f64>> {
    if weights.len() != n_classes {
        return Err(invalid(format!(
            "leaf {node} has {} class weights, expected {n_classes}",
            weights.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(invalid(format!("leaf {node} has a negative or non-finite weight")));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(invalid(format!("leaf {node} has no weight")));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::InvalidEstimator(msg.into())
}
