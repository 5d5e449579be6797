use std::{error::Error, fmt, io};

/// The predictor module's result type.
pub type Result<T> = std::result::Result<T, PredictErr>;

/// Failures while loading a model artifact or running a prediction.
#[derive(Debug)]
pub enum PredictErr {
    Io(io::Error),
    Parse(serde_json::Error),
    /// The artifact parsed but describes an unusable model.
    InvalidArtifact(String),
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

impl fmt::Display for PredictErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Parse(e) => write!(f, "invalid model artifact: {e}"),
            Self::InvalidArtifact(msg) => write!(f, "invalid model artifact: {msg}"),
            Self::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
        }
    }
}

impl Error for PredictErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PredictErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PredictErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}
