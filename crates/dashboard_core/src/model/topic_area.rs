//! Topic area record: a category grouping dashboards.

use super::{require_text, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicArea {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl TopicArea {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("topic_area", "id", &self.id)?;
        require_text("topic_area", "name", &self.name)?;
        Ok(())
    }
}
