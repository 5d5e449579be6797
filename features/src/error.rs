use std::{error::Error, fmt};

use serde_json::Value;

/// The features module's result type.
pub type Result<T> = std::result::Result<T, FeatureErr>;

/// The category a [`FeatureErr`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingKey,
    ShapeMismatch,
    TypeMismatch,
    UnknownCategory,
}

/// Validation failures for a request's feature rows.
///
/// Every variant is a caller error, the whole batch is rejected on the first one.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureErr {
    /// The request payload lacks a required key.
    MissingKey { key: &'static str },
    /// A row has the wrong number of values.
    ShapeMismatch {
        row: usize,
        got: usize,
        expected: usize,
    },
    /// A value has the wrong JSON type for its column.
    TypeMismatch {
        row: usize,
        column: String,
        expected: &'static str,
        got: Value,
    },
    /// A categorical value is not part of its column's mapping.
    UnknownCategory {
        row: usize,
        column: String,
        value: String,
    },
}

impl FeatureErr {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingKey { .. } => ErrorKind::MissingKey,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::UnknownCategory { .. } => ErrorKind::UnknownCategory,
        }
    }

    /// Returns the index of the offending row, if the error concerns one.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::MissingKey { .. } => None,
            Self::ShapeMismatch { row, .. }
            | Self::TypeMismatch { row, .. }
            | Self::UnknownCategory { row, .. } => Some(*row),
        }
    }
}

impl fmt::Display for FeatureErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey { key } => write!(f, "Missing '{key}' key in request data"),
            Self::ShapeMismatch { row, got, expected } => {
                write!(f, "Row at index {row} has {got} values, expected {expected}")
            }
            Self::TypeMismatch {
                row,
                column,
                expected,
                got,
            } => write!(
                f,
                "Invalid type for '{column}' at index {row}: expected {expected}, got {got}"
            ),
            Self::UnknownCategory { row, column, value } => {
                write!(f, "Invalid value for '{column}' at index {row}: {value}")
            }
        }
    }
}

impl Error for FeatureErr {}
