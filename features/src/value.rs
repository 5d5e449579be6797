use serde::Serialize;

/// A single model-ready value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    Int(i64),
    Float(f64),
}

impl NormalizedValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

/// A validated row: same width and column order as the schema it was checked against,
/// with every categorical value replaced by its code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRow(Vec<NormalizedValue>);

impl NormalizedRow {
    pub(crate) fn new(values: Vec<NormalizedValue>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[NormalizedValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the row as floating point values, in column order.
    pub fn to_f64(&self) -> Vec<f64> {
        self.0.iter().map(|v| v.as_f64()).collect()
    }
}
