//! Serves predictions of a pre-trained tabular model over HTTP.
//!
//! Every request's rows are validated and normalized against a fixed column schema
//! before they reach the model.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod routes;

pub use config::{SchemaSource, ServeConfig};
pub use dispatcher::{Dispatcher, PredictResponse};
pub use error::{ConfigErr, ServeErr};
pub use routes::router;
