use std::{fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    forest::{ForestClassifier, ForestRegressor},
    linear::LinearRegressor,
    model::Predictor,
};

/// A serialized, pre-trained model as found in the model store.
///
/// The JSON document carries a `kind` tag next to the model's own fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    ForestClassifier(ForestClassifier),
    ForestRegressor(ForestRegressor),
    LinearRegressor(LinearRegressor),
}

impl ModelArtifact {
    /// Parses and validates an artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Turns the artifact into a shareable predictor.
    pub fn into_predictor(self) -> Box<dyn Predictor> {
        match self {
            Self::ForestClassifier(m) => Box::new(m),
            Self::ForestRegressor(m) => Box::new(m),
            Self::LinearRegressor(m) => Box::new(m),
        }
    }
}

/// Loads a model from the store.
///
/// # Arguments
/// * `path` - The artifact file.
///
/// # Returns
/// The validated model, or the reason it could not be read.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Box<dyn Predictor>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let model = ModelArtifact::from_json(&content)?.into_predictor();

    info!(
        "loaded {} with {} features from {}",
        model.kind(),
        model.n_features(),
        path.display()
    );
    Ok(model)
}
