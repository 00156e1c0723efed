//! Pre-trained classifier: artifact format, validation and inference.
//!
//! A model artifact is a JSON document declaring the columns it was trained
//! on, its class labels and one estimator. Loading validates the whole
//! contract up front (format version, schema, binary classes, estimator
//! structure), so a model that loads can always be evaluated on an
//! [`InputRecord`](crate::schema::InputRecord) row.

pub mod forest;
pub mod logistic;
pub mod tree;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::schema::{check_columns, COLUMNS, SCHEMA_VERSION};
use forest::RandomForest;
use logistic::{LogisticRegression, Scaler};
use tree::{DecisionTree, TreeSpec};

/// Artifact layout version understood by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// The only supported label set: class 1 means "tsunami".
pub const BINARY_CLASSES: [i64; 2] = [0, 1];

// ── Classifier seam ───────────────────────────────────────────────────────────

/// What the predictor and presenter need from a model.
pub trait Classifier: Send + Sync {
    /// Columns the model was trained on, in input order.
    fn feature_names(&self) -> &[String];

    /// Class labels, aligned with [`Classifier::predict_proba`] output.
    fn classes(&self) -> &[i64];

    /// Per-class probabilities for one row.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>>;

    /// Class label for one row: the label with the highest probability.
    fn predict(&self, row: &[f64]) -> Result<i64> {
        let proba = self.predict_proba(row)?;
        let idx = tree::argmax(&proba);
        self.classes()
            .get(idx)
            .copied()
            .ok_or(ModelError::ProbabilityShape(proba.len()))
    }

    /// Importance weight per input column, if the model type has them.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }

    /// Short estimator name for diagnostics.
    fn kind(&self) -> &str {
        "unknown"
    }
}

/// Check the parts of the contract the dashboard relies on: exact schema and
/// binary `[0, 1]` labels.
pub fn check_contract(model: &dyn Classifier) -> Result<()> {
    check_columns(model.feature_names())?;
    if model.classes() != BINARY_CLASSES {
        return Err(ModelError::UnsupportedClasses(model.classes().to_vec()));
    }
    Ok(())
}

// ── Artifact ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub estimator: EstimatorSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSpec {
    RandomForest {
        trees: Vec<TreeSpec>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_importances: Option<Vec<f64>>,
    },
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scaler: Option<Scaler>,
    },
}

#[derive(Debug, Clone)]
enum Estimator {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

// ── Loaded model ──────────────────────────────────────────────────────────────

/// A validated, ready-to-evaluate model.
#[derive(Debug, Clone)]
pub struct TsunamiModel {
    feature_names: Vec<String>,
    classes: Vec<i64>,
    estimator: Estimator,
}

impl TsunamiModel {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(text)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        if artifact.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat { found: artifact.format_version, expected: FORMAT_VERSION });
        }
        if artifact.schema_version != SCHEMA_VERSION {
            return Err(ModelError::SchemaMismatch(format!(
                "model schema version {} does not match dashboard schema version {SCHEMA_VERSION}",
                artifact.schema_version
            )));
        }

        let n_features = artifact.feature_names.len();
        let n_classes = artifact.classes.len();
        let estimator = match artifact.estimator {
            EstimatorSpec::RandomForest { trees, feature_importances } => {
                let trees = trees
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| {
                        DecisionTree::from_spec(spec, n_features, n_classes).map_err(|e| match e {
                            ModelError::InvalidEstimator(msg) => ModelError::InvalidEstimator(format!("tree {i}: {msg}")),
                            other => other,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Estimator::RandomForest(RandomForest::from_trees(trees, feature_importances)?)
            }
            EstimatorSpec::LogisticRegression { coefficients, intercept, scaler } => {
                if coefficients.len() != n_features {
                    return Err(ModelError::InvalidEstimator(format!(
                        "{} coefficients for {n_features} features",
                        coefficients.len()
                    )));
                }
                if n_classes != 2 {
                    return Err(ModelError::UnsupportedClasses(artifact.classes));
                }
                Estimator::LogisticRegression(LogisticRegression::new(coefficients, intercept, scaler)?)
            }
        };

        let model = Self { feature_names: artifact.feature_names, classes: artifact.classes, estimator };
        check_contract(&model)?;
        Ok(model)
    }
}

impl Classifier for TsunamiModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.feature_names.len() {
            return Err(ModelError::FeatureCount { expected: self.feature_names.len(), found: row.len() });
        }
        Ok(match &self.estimator {
            Estimator::RandomForest(f) => f.predict_proba(row),
            Estimator::LogisticRegression(lr) => lr.predict_proba(row),
        })
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        match &self.estimator {
            Estimator::RandomForest(f) => f.feature_importances(),
            Estimator::LogisticRegression(_) => None,
        }
    }

    fn kind(&self) -> &str {
        match &self.estimator {
            Estimator::RandomForest(_) => "random_forest",
            Estimator::LogisticRegression(_) => "logistic_regression",
        }
    }
}

// ── Description ───────────────────────────────────────────────────────────────

/// Summary of a loaded model's contract, for `/api/schema` and `predict --describe`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescription {
    pub estimator: String,
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub has_feature_importances: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

pub fn describe(model: &dyn Classifier) -> ModelDescription {
    let importances = model.feature_importances().map(<[f64]>::to_vec);
    ModelDescription {
        estimator: model.kind().to_string(),
        schema_version: SCHEMA_VERSION,
        feature_names: model.feature_names().to_vec(),
        classes: model.classes().to_vec(),
        has_feature_importances: importances.is_some(),
        feature_importances: importances,
    }
}

/// The training columns as owned strings, for building artifacts in code.
pub fn schema_feature_names() -> Vec<String> {
    COLUMNS.iter().map(|c| c.to_string()).collect()
}
