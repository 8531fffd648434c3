use super::{new_id, required, required_text, BuilderResult};
use crate::model::dataset::Dataset;
use crate::model::widget::{Widget, WidgetType, CONTENT_DATASET_ID, CONTENT_S3_KEY};
use crate::repo::content_repo::ContentRepository;
use crate::repo::item_repo::ItemRepository;
use chrono::Utc;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Default)]
pub struct WidgetBuilder {
    id: Option<String>,
    name: Option<String>,
    dashboard_id: Option<String>,
    widget_type: Option<WidgetType>,
    order: u32,
    show_title: Option<bool>,
    section: Option<String>,
    content: Map<String, Value>,
}

impl WidgetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_widget(widget: &Widget) -> Self {
        Self {
            id: Some(widget.id.clone()),
            name: Some(widget.name.clone()),
            dashboard_id: Some(widget.dashboard_id.clone()),
            widget_type: Some(widget.widget_type),
            order: widget.order,
            show_title: Some(widget.show_title),
            section: widget.section.clone(),
            content: widget.content.as_object().cloned().unwrap_or_default(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn dashboard_id(mut self, dashboard_id: impl Into<String>) -> Self {
        self.dashboard_id = Some(dashboard_id.into());
        self
    }

    pub fn widget_type(mut self, widget_type: WidgetType) -> Self {
        self.widget_type = Some(widget_type);
        self
    }

    pub fn order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn show_title(mut self, show: bool) -> Self {
        self.show_title = Some(show);
        self
    }

    /// Places the widget inside a section widget.
    pub fn section(mut self, section_id: impl Into<String>) -> Self {
        self.section = Some(section_id.into());
        self
    }

    /// Replaces content with a JSON object; non-object values are ignored.
    pub fn content(mut self, content: Value) -> Self {
        if let Value::Object(map) = content {
            self.content = map;
        }
        self
    }

    pub fn content_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.content.insert(key.into(), value);
        self
    }

    /// Points chart/table/metrics content at a dataset.
    pub fn dataset(mut self, dataset: &Dataset) -> Self {
        self.content
            .insert(CONTENT_DATASET_ID.to_string(), Value::String(dataset.id.clone()));
        self.content.insert(
            CONTENT_S3_KEY.to_string(),
            json!({ "raw": dataset.s3_key.raw, "json": dataset.s3_key.json }),
        );
        self
    }

    pub fn build(self) -> BuilderResult<Widget> {
        let name = required_text("name", self.name)?;
        let dashboard_id = required_text("dashboard_id", self.dashboard_id)?;
        let widget_type = required("widget_type", self.widget_type)?;

        let widget = Widget {
            id: self.id.unwrap_or_else(new_id),
            name,
            dashboard_id,
            widget_type,
            order: self.order,
            show_title: self.show_title.unwrap_or(true),
            section: self.section.filter(|section| !section.is_empty()),
            content: Value::Object(self.content),
            updated_at: Utc::now(),
        };
        widget.validate()?;
        Ok(widget)
    }

    pub fn save<R: ItemRepository>(self, repo: &ContentRepository<R>) -> BuilderResult<Widget> {
        let widget = self.build()?;
        repo.save_widget(&widget)?;
        Ok(widget)
    }
}
