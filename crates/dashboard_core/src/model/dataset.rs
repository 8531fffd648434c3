//! Dataset record: a named CSV/JSON data source backing charts and tables.

use super::{require_text, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object keys of the two stored renditions of one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetKeys {
    /// Uploaded source file (usually CSV).
    #[serde(default)]
    pub raw: String,
    /// Parsed JSON rows served to widgets.
    #[serde(default)]
    pub json: String,
}

impl DatasetKeys {
    pub fn for_id(id: &str, raw_extension: &str) -> Self {
        Self {
            raw: format!("{id}.{raw_extension}"),
            json: format!("{id}.json"),
        }
    }

    /// Returns non-empty keys, raw first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        [self.raw.as_str(), self.json.as_str()]
            .into_iter()
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    FileUpload,
    IngestApi,
    StaticDataset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub s3_key: DatasetKeys,
    #[serde(default = "default_source_type")]
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_source_type() -> SourceType {
    SourceType::FileUpload
}

impl Dataset {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("dataset", "id", &self.id)?;
        require_text("dataset", "name", &self.name)?;
        require_text("dataset", "s3_key.json", &self.s3_key.json)?;
        Ok(())
    }
}
