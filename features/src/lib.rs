//! Validation and normalization of raw feature rows into model-ready numeric rows.

pub mod error;
pub mod mapping;
pub mod normalize;
pub mod schema;
pub mod value;

pub use error::{ErrorKind, FeatureErr};
pub use mapping::CategoryMapping;
pub use normalize::{auto_wrap, extract_features, normalize, normalize_row, rows_to_matrix};
pub use schema::{Accept, Coerce, Column, ColumnKind, Schema, SchemaErr};
pub use value::{NormalizedRow, NormalizedValue};
