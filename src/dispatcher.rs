use std::sync::Arc;

use features::{Schema, auto_wrap, extract_features, normalize, rows_to_matrix};
use log::debug;
use ndarray::ArrayView2;
use predictor::{Classifier, Output, PredictErr, Predictor};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigErr, ServeErr};

/// The body of a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    /// A classifier's answer for a single row.
    Single { prediction: i64, confidence: f64 },
    /// A classifier's answers for a batch, without confidences.
    Labels { predictions: Vec<i64> },
    /// A regressor's answers, batch shaped even for a single row.
    Values { predictions: Vec<f64> },
}

/// Validates requests against the active schema and runs them through the model.
///
/// Both the schema and the model are read-only, cloning a dispatcher only clones the
/// shared handles.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    schema: Arc<Schema>,
    model: Arc<dyn Predictor>,
}

impl Dispatcher {
    /// Creates a new `Dispatcher`.
    ///
    /// # Arguments
    /// * `schema` - The column layout requests are checked against.
    /// * `model` - The loaded model.
    ///
    /// # Returns
    /// The dispatcher, or `ModelMismatch` if the model expects rows of another width.
    pub fn new(schema: Schema, model: Box<dyn Predictor>) -> Result<Self, ConfigErr> {
        if schema.width() != model.n_features() {
            return Err(ConfigErr::ModelMismatch {
                schema: schema.name().to_string(),
                width: schema.width(),
                n_features: model.n_features(),
            });
        }

        Ok(Self {
            schema: Arc::new(schema),
            model: Arc::from(model),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn model(&self) -> &dyn Predictor {
        self.model.as_ref()
    }

    /// Handles the body of a prediction request.
    ///
    /// # Arguments
    /// * `payload` - The parsed JSON body, expected to hold a `features` entry with one
    ///   row or a list of rows.
    ///
    /// # Returns
    /// A single prediction with its confidence when a classifier gets exactly one row,
    /// a list of predictions otherwise. Validation problems come back as
    /// `ServeErr::Feature` and model failures as `ServeErr::Predict`.
    pub fn handle_predict(&self, payload: &Value) -> Result<PredictResponse, ServeErr> {
        let features = extract_features(payload)?;
        let rows = auto_wrap(features)?;
        let normalized = normalize(&self.schema, rows)?;
        let x = rows_to_matrix(&normalized, self.schema.width())?;

        debug!("predicting {} row(s) with {}", x.nrows(), self.model.kind());

        let response = match self.model.predict(x.view())? {
            Output::Values(predictions) => PredictResponse::Values { predictions },
            Output::Labels(labels) => match self.model.as_classifier() {
                Some(classifier) if labels.len() == 1 => {
                    let prediction = labels[0];
                    PredictResponse::Single {
                        prediction,
                        confidence: confidence(classifier, x.view(), prediction)?,
                    }
                }
                _ => PredictResponse::Labels {
                    predictions: labels,
                },
            },
        };

        Ok(response)
    }
}

/// Returns the probability the classifier gives to `label` for the first row of `x`.
// TODO: decide whether batch responses should carry one confidence per row.
fn confidence(
    classifier: &dyn Classifier,
    x: ArrayView2<'_, f64>,
    label: i64,
) -> Result<f64, PredictErr> {
    let proba = classifier.predict_proba(x)?;
    let column = classifier
        .classes()
        .iter()
        .position(|&c| c == label)
        .ok_or_else(|| {
            PredictErr::InvalidArtifact(format!("predicted label {label} is not a known class"))
        })?;

    proba
        .get((0, column))
        .copied()
        .ok_or(PredictErr::ShapeMismatch {
            what: "probabilities",
            got: proba.ncols(),
            expected: classifier.classes().len(),
        })
}
