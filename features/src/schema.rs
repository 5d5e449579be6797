use std::{error::Error, fmt, fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::mapping::CategoryMapping;

/// Which JSON numbers a numeric column accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accept {
    /// Only numbers written as floating point (`5.0` but not `5`).
    Float,
    /// Any JSON number.
    Number,
}

/// How an accepted numeric value is converted before reaching the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coerce {
    /// Truncate toward zero.
    Int,
    Float,
}

/// The expected content of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric { accept: Accept, coerce: Coerce },
    Categorical { mapping: CategoryMapping },
}

/// A named column of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl Column {
    pub fn numeric(name: &str, accept: Accept, coerce: Coerce) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Numeric { accept, coerce },
        }
    }

    pub fn categorical(name: &str, mapping: CategoryMapping) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Categorical { mapping },
        }
    }

    /// Returns the mapping of this column if it is categorical.
    pub fn mapping(&self) -> Option<&CategoryMapping> {
        match &self.kind {
            ColumnKind::Categorical { mapping } => Some(mapping),
            ColumnKind::Numeric { .. } => None,
        }
    }
}

/// Failures while building or loading a [`Schema`].
#[derive(Debug)]
pub enum SchemaErr {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for SchemaErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Parse(e) => write!(f, "invalid schema JSON: {e}"),
            Self::Invalid(msg) => write!(f, "invalid schema: {msg}"),
        }
    }
}

impl Error for SchemaErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for SchemaErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SchemaErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// The ordered, fixed-width column layout every row must follow.
///
/// A schema is built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a new `Schema`.
    ///
    /// # Arguments
    /// * `name` - A name used in logs.
    /// * `columns` - The columns in row order.
    ///
    /// # Returns
    /// The schema, or an error if it has no columns or repeats a column name.
    pub fn new(name: &str, columns: Vec<Column>) -> Result<Self, SchemaErr> {
        let schema = Self {
            name: name.to_string(),
            columns,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// The classification layout: four floating point measurements.
    pub fn iris() -> Self {
        let columns = ["sepal_length", "sepal_width", "petal_length", "petal_width"]
            .into_iter()
            .map(|name| Column::numeric(name, Accept::Float, Coerce::Float))
            .collect();

        Self {
            name: "iris".to_string(),
            columns,
        }
    }

    /// The regression layout: twelve mixed columns describing a house.
    pub fn housing() -> Self {
        let int = |name| Column::numeric(name, Accept::Number, Coerce::Int);
        let yes_no = |name| Column::categorical(name, CategoryMapping::yes_no());
        let furnishing = CategoryMapping::from_static(&[
            ("furnished", 0),
            ("semi-furnished", 1),
            ("unfurnished", 2),
        ]);

        Self {
            name: "housing".to_string(),
            columns: vec![
                int("area"),
                int("bedrooms"),
                int("bathrooms"),
                int("stories"),
                yes_no("mainroad"),
                yes_no("guestroom"),
                yes_no("basement"),
                yes_no("hotwaterheating"),
                yes_no("airconditioning"),
                int("parking"),
                yes_no("prefarea"),
                Column::categorical("furnishingstatus", furnishing),
            ],
        }
    }

    /// Parses a schema from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, SchemaErr> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Reads a schema from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaErr> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the number of values every row must have.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column named `name`, if any.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn validate(&self) -> Result<(), SchemaErr> {
        if self.columns.is_empty() {
            return Err(SchemaErr::Invalid(format!(
                "schema '{}' has no columns",
                self.name
            )));
        }

        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(SchemaErr::Invalid(format!(
                    "column '{}' is declared more than once",
                    column.name
                )));
            }
        }

        Ok(())
    }
}
