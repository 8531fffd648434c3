//! Widget record: one content unit on a dashboard.
//!
//! Content is kept as a JSON object because every widget type carries a
//! different shape. The accessors below cover the fields the pipeline reads.
//!
//! # Invariants
//! - Chart/Table/Metrics content references a dataset via `datasetId` or
//!   `s3Key.json`.
//! - Section content lists children in `widgetIds`; a section never lists
//!   itself.

use super::{require_text, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CONTENT_DATASET_ID: &str = "datasetId";
pub const CONTENT_S3_KEY: &str = "s3Key";
pub const CONTENT_WIDGET_IDS: &str = "widgetIds";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetType {
    Text,
    Chart,
    Table,
    Image,
    Metrics,
    Section,
}

impl WidgetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Chart => "Chart",
            Self::Table => "Table",
            Self::Image => "Image",
            Self::Metrics => "Metrics",
            Self::Section => "Section",
        }
    }

    /// Whether widgets of this type render rows from a dataset.
    pub fn uses_dataset(self) -> bool {
        matches!(self, Self::Chart | Self::Table | Self::Metrics)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dashboard_id: String,
    pub widget_type: WidgetType,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_show_title")]
    pub show_title: bool,
    /// Parent section widget id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default = "empty_content")]
    pub content: Value,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_show_title() -> bool {
    true
}

fn empty_content() -> Value {
    Value::Object(Map::new())
}

impl Widget {
    pub fn dataset_id(&self) -> Option<&str> {
        self.content
            .get(CONTENT_DATASET_ID)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn dataset_json_key(&self) -> Option<&str> {
        self.content_s3_key("json")
    }

    pub fn dataset_raw_key(&self) -> Option<&str> {
        self.content_s3_key("raw")
    }

    fn content_s3_key(&self, which: &str) -> Option<&str> {
        self.content
            .get(CONTENT_S3_KEY)
            .and_then(|keys| keys.get(which))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Child widget ids of a section, in declared order.
    pub fn child_widget_ids(&self) -> Vec<&str> {
        self.content
            .get(CONTENT_WIDGET_IDS)
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Appends a child id to section content, ignoring duplicates.
    pub fn push_child_widget_id(&mut self, child_id: &str) {
        if !self.content.is_object() {
            self.content = empty_content();
        }
        if let Some(content) = self.content.as_object_mut() {
            let ids = content
                .entry(CONTENT_WIDGET_IDS)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(ids) = ids.as_array_mut() {
                if !ids.iter().any(|id| id.as_str() == Some(child_id)) {
                    ids.push(Value::String(child_id.to_string()));
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("widget", "id", &self.id)?;
        require_text("widget", "name", &self.name)?;
        require_text("widget", "dashboard_id", &self.dashboard_id)?;

        if !self.content.is_object() {
            return Err(ModelValidationError::InvalidContent {
                widget_id: self.id.clone(),
                reason: "content must be a JSON object".to_string(),
            });
        }

        if self.widget_type.uses_dataset()
            && self.dataset_id().is_none()
            && self.dataset_json_key().is_none()
        {
            return Err(ModelValidationError::InvalidContent {
                widget_id: self.id.clone(),
                reason: format!(
                    "{} widget requires `{CONTENT_DATASET_ID}` or `{CONTENT_S3_KEY}.json`",
                    self.widget_type.as_str()
                ),
            });
        }

        if self.section.as_deref() == Some(self.id.as_str())
            || self.child_widget_ids().contains(&self.id.as_str())
        {
            return Err(ModelValidationError::SelfReference {
                entity: "widget",
                id: self.id.clone(),
            });
        }

        Ok(())
    }
}
