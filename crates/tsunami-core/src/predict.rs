//! Run the classifier on one assembled record.

use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::model::{Classifier, BINARY_CLASSES};
use crate::schema::InputRecord;

/// Class label and tsunami probability for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// 1 = tsunami predicted.
    pub class: i64,
    /// Probability of class 1, in [0, 1].
    pub probability: f64,
}

impl Prediction {
    pub fn is_tsunami(&self) -> bool {
        self.class == 1
    }

    /// Probability of class 1 as a percentage, in [0, 100].
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

/// Classify `record` and estimate its tsunami probability.
///
/// Requires a binary model labelled `[0, 1]`; the probability reported is the
/// one at index 1. Model errors are returned as-is.
pub fn predict(model: &dyn Classifier, record: &InputRecord) -> Result<Prediction> {
    if model.classes() != BINARY_CLASSES {
        return Err(ModelError::UnsupportedClasses(model.classes().to_vec()));
    }

    let row = record.to_row();
    let class = model.predict(&row)?;
    let proba = model.predict_proba(&row)?;
    if proba.len() != BINARY_CLASSES.len() {
        return Err(ModelError::ProbabilityShape(proba.len()));
    }
    if !BINARY_CLASSES.contains(&class) {
        return Err(ModelError::UnsupportedClasses(vec![class]));
    }

    let prediction = Prediction { class, probability: proba[1].clamp(0.0, 1.0) };
    tracing::debug!(class, probability = prediction.probability, "prediction");
    Ok(prediction)
}
