use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{
    PredictErr, Result,
    model::{Output, Predictor, check_width},
};

#[derive(Deserialize)]
struct LinearParts {
    n_features: usize,
    coefficients: Vec<f64>,
    intercept: f64,
}

/// An ordinary linear model: `y = x · coefficients + intercept`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LinearParts")]
pub struct LinearRegressor {
    n_features: usize,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    /// Creates a new `LinearRegressor`.
    ///
    /// # Arguments
    /// * `coefficients` - One weight per input column.
    /// * `intercept` - The bias term.
    ///
    /// # Returns
    /// The model, or an error if there are no coefficients or some are not finite.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(PredictErr::InvalidArtifact(
                "a linear model needs at least one coefficient".into(),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PredictErr::InvalidArtifact(
                "linear model parameters must be finite".into(),
            ));
        }

        Ok(Self {
            n_features: coefficients.len(),
            coefficients,
            intercept,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl TryFrom<LinearParts> for LinearRegressor {
    type Error = PredictErr;

    fn try_from(value: LinearParts) -> Result<Self> {
        if value.coefficients.len() != value.n_features {
            return Err(PredictErr::ShapeMismatch {
                what: "coefficients",
                got: value.coefficients.len(),
                expected: value.n_features,
            });
        }
        Self::new(value.coefficients, value.intercept)
    }
}

impl Predictor for LinearRegressor {
    fn kind(&self) -> &'static str {
        "linear_regressor"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Output> {
        check_width(&x, self.n_features)?;

        let w = ArrayView1::from(self.coefficients.as_slice());
        let y = x.dot(&w) + self.intercept;
        Ok(Output::Values(y.to_vec()))
    }
}
