//! Pipeline configuration.
//!
//! # Responsibility
//! - Describe where example assets, dataset files and the document table live.
//! - Load overrides from an optional TOML file.
//!
//! # Invariants
//! - Bucket names are single path segments.
//! - `language` and `actor` are never blank after `validate()`.

use crate::storage::validate_bucket;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXAMPLES_BUCKET: &str = "examples";
pub const DEFAULT_DATASETS_BUCKET: &str = "datasets";
pub const DEFAULT_LANGUAGE: &str = "english";
pub const DEFAULT_ACTOR: &str = "examples-pipeline";
pub const DEFAULT_TOPIC_AREA: &str = "Example Topic Area";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding one subdirectory per bucket.
    pub storage_root: PathBuf,
    pub examples_bucket: String,
    pub datasets_bucket: String,
    /// SQLite file backing the document table.
    pub database_path: PathBuf,
    pub language: String,
    /// Recorded as `createdBy` on imported records.
    pub actor: String,
    /// Topic area used when an example names none.
    pub default_topic_area: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("storage"),
            examples_bucket: DEFAULT_EXAMPLES_BUCKET.to_string(),
            datasets_bucket: DEFAULT_DATASETS_BUCKET.to_string(),
            database_path: PathBuf::from("dashboards.sqlite3"),
            language: DEFAULT_LANGUAGE.to_string(),
            actor: DEFAULT_ACTOR.to_string(),
            default_topic_area: DEFAULT_TOPIC_AREA.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parses TOML; absent keys keep their defaults.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, bucket) in [
            ("examples_bucket", &self.examples_bucket),
            ("datasets_bucket", &self.datasets_bucket),
        ] {
            validate_bucket(bucket)
                .map_err(|_| ConfigError::Invalid(format!("{field} `{bucket}` is not a bucket name")))?;
        }
        if self.examples_bucket == self.datasets_bucket {
            return Err(ConfigError::Invalid(
                "examples_bucket and datasets_bucket must differ".to_string(),
            ));
        }
        for (field, value) in [
            ("language", &self.language),
            ("actor", &self.actor),
            ("default_topic_area", &self.default_topic_area),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} cannot be empty")));
            }
        }
        if self.language.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "language `{}` cannot contain `/`",
                self.language
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PipelineConfig};
    use std::path::Path;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config =
            PipelineConfig::from_toml_str("language = \"spanish\"\n", Path::new("x.toml")).unwrap();
        assert_eq!(config.language, "spanish");
        assert_eq!(config.examples_bucket, "examples");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PipelineConfig::from_toml_str("bucket = \"x\"\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn same_bucket_for_examples_and_datasets_is_invalid() {
        let config = PipelineConfig {
            datasets_bucket: "examples".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
