use std::{env, path::PathBuf};

use features::Schema;

use crate::error::ConfigErr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 9000;
const DEFAULT_MODEL_PATH: &str = "models/iris_forest.json";

/// Where the active column layout comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Iris,
    Housing,
    /// A schema JSON file.
    File(PathBuf),
}

impl SchemaSource {
    fn parse(value: &str) -> Self {
        match value {
            "iris" => Self::Iris,
            "housing" => Self::Housing,
            path => Self::File(PathBuf::from(path)),
        }
    }

    /// Builds or reads the schema.
    pub fn load(&self) -> Result<Schema, ConfigErr> {
        Ok(match self {
            Self::Iris => Schema::iris(),
            Self::Housing => Schema::housing(),
            Self::File(path) => Schema::load(path)?,
        })
    }
}

/// Immutable service settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub schema: SchemaSource,
}

impl ServeConfig {
    /// Reads the configuration from `HOST`, `PORT`, `MODEL_PATH` and `SCHEMA`.
    pub fn from_env() -> Result<Self, ConfigErr> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for unset keys.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, if set.
    ///
    /// # Returns
    /// The configuration, or an error if a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigErr>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &'static str| match lookup(key) {
            Some(v) if v.trim().is_empty() => Err(ConfigErr::Empty(key)),
            other => Ok(other),
        };

        let host = non_empty("HOST")?.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty("PORT")? {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigErr::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };
        let model_path = non_empty("MODEL_PATH")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        let schema = non_empty("SCHEMA")?
            .map(|v| SchemaSource::parse(v.trim()))
            .unwrap_or(SchemaSource::Iris);

        Ok(Self {
            host,
            port,
            model_path,
            schema,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
