//! The model store: pre-trained predictors loaded once from JSON artifacts.

pub mod error;
pub mod forest;
pub mod linear;
pub mod model;
pub mod store;
pub mod tree;

pub use error::{PredictErr, Result};
pub use forest::{ForestClassifier, ForestRegressor};
pub use linear::LinearRegressor;
pub use model::{Classifier, Output, Predictor};
pub use store::{ModelArtifact, load};
pub use tree::{Node, Tree};
