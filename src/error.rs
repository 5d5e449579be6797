use std::{error::Error, fmt, num::ParseIntError};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use features::{FeatureErr, SchemaErr};
use predictor::PredictErr;
use serde::Serialize;

/// Failures while handling a prediction request.
#[derive(Debug)]
pub enum ServeErr {
    /// The request's rows did not pass validation.
    Feature(FeatureErr),
    /// The request body is not a JSON document.
    BadPayload(String),
    /// The model failed on rows that passed validation.
    Predict(PredictErr),
}

impl ServeErr {
    /// Returns the HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Feature(_) | Self::BadPayload(_) => StatusCode::BAD_REQUEST,
            Self::Predict(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ServeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature(e) => write!(f, "{e}"),
            Self::BadPayload(msg) => write!(f, "{msg}"),
            Self::Predict(e) => write!(f, "prediction failed: {e}"),
        }
    }
}

impl Error for ServeErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Feature(e) => Some(e),
            Self::Predict(e) => Some(e),
            Self::BadPayload(_) => None,
        }
    }
}

impl From<FeatureErr> for ServeErr {
    fn from(value: FeatureErr) -> Self {
        Self::Feature(value)
    }
}

impl From<PredictErr> for ServeErr {
    fn from(value: PredictErr) -> Self {
        Self::Predict(value)
    }
}

/// The body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServeErr {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Failures while starting the service.
#[derive(Debug)]
pub enum ConfigErr {
    InvalidPort { value: String, source: ParseIntError },
    /// A variable is set but empty.
    Empty(&'static str),
    Schema(SchemaErr),
    /// The schema and the model disagree on the row width.
    ModelMismatch {
        schema: String,
        width: usize,
        n_features: usize,
    },
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { value, source } => write!(f, "invalid PORT '{value}': {source}"),
            Self::Empty(var) => write!(f, "{var} must not be empty"),
            Self::Schema(e) => write!(f, "{e}"),
            Self::ModelMismatch {
                schema,
                width,
                n_features,
            } => write!(
                f,
                "schema '{schema}' has {width} columns but the model expects {n_features} features"
            ),
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPort { source, .. } => Some(source),
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemaErr> for ConfigErr {
    fn from(value: SchemaErr) -> Self {
        Self::Schema(value)
    }
}
