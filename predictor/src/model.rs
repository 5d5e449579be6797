use std::fmt;

use ndarray::{Array2, ArrayView2};

use crate::{PredictErr, Result};

/// What a model returns for a batch of rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// One class label per row.
    Labels(Vec<i64>),
    /// One value per row.
    Values(Vec<f64>),
}

impl Output {
    pub fn len(&self) -> usize {
        match self {
            Output::Labels(v) => v.len(),
            Output::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pre-trained model. Prediction has no side effects, so a single instance can be
/// shared between concurrent requests.
pub trait Predictor: fmt::Debug + Send + Sync {
    /// A short name for logs, such as `forest_classifier`.
    fn kind(&self) -> &'static str;

    /// Returns the number of columns every input row must have.
    fn n_features(&self) -> usize;

    /// Predicts every row of `x`.
    ///
    /// # Arguments
    /// * `x` - A `(rows, n_features)` matrix.
    ///
    /// # Returns
    /// One output per row, or `ShapeMismatch` if `x` has the wrong width.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Output>;

    /// Returns this model as a classifier, if it is one.
    fn as_classifier(&self) -> Option<&dyn Classifier> {
        None
    }
}

/// A model that also estimates class probabilities.
pub trait Classifier: Predictor {
    /// The labels this model can predict, in probability column order.
    fn classes(&self) -> &[i64];

    /// Estimates class probabilities for every row of `x`.
    ///
    /// # Returns
    /// A `(rows, classes)` matrix whose rows sum to one.
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>>;
}

pub(crate) fn check_width(x: &ArrayView2<'_, f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(PredictErr::ShapeMismatch {
            what: "features",
            got: x.ncols(),
            expected: n_features,
        });
    }
    Ok(())
}
