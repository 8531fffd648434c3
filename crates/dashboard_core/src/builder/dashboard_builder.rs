use super::{new_id, required_text, BuilderResult};
use crate::model::dashboard::{Dashboard, DashboardState};
use crate::model::topic_area::TopicArea;
use crate::repo::content_repo::ContentRepository;
use crate::repo::item_repo::ItemRepository;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct DashboardBuilder {
    id: Option<String>,
    version: Option<u32>,
    parent_dashboard_id: Option<String>,
    name: Option<String>,
    topic_area_id: Option<String>,
    topic_area_name: Option<String>,
    description: Option<String>,
    display_table_of_contents: bool,
    table_of_contents: BTreeMap<String, bool>,
    state: Option<DashboardState>,
    release_notes: Option<String>,
    friendly_url: Option<String>,
    language: Option<String>,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl DashboardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing record, e.g. a snapshot read from examples.
    pub fn from_dashboard(dashboard: &Dashboard) -> Self {
        Self {
            id: Some(dashboard.id.clone()),
            version: Some(dashboard.version),
            parent_dashboard_id: dashboard.parent_dashboard_id.clone(),
            name: Some(dashboard.name.clone()),
            topic_area_id: Some(dashboard.topic_area_id.clone()),
            topic_area_name: Some(dashboard.topic_area_name.clone()),
            description: Some(dashboard.description.clone()),
            display_table_of_contents: dashboard.display_table_of_contents,
            table_of_contents: dashboard.table_of_contents.clone(),
            state: Some(dashboard.state),
            release_notes: dashboard.release_notes.clone(),
            friendly_url: dashboard.friendly_url.clone(),
            language: Some(dashboard.language.clone()),
            created_by: Some(dashboard.created_by.clone()),
            created_at: Some(dashboard.created_at),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn parent_dashboard_id(mut self, id: impl Into<String>) -> Self {
        self.parent_dashboard_id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets both topic area id and denormalized topic area name.
    pub fn topic_area(mut self, topic_area: &TopicArea) -> Self {
        self.topic_area_id = Some(topic_area.id.clone());
        self.topic_area_name = Some(topic_area.name.clone());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn display_table_of_contents(mut self, display: bool) -> Self {
        self.display_table_of_contents = display;
        self
    }

    pub fn table_of_contents(mut self, table_of_contents: BTreeMap<String, bool>) -> Self {
        self.table_of_contents = table_of_contents;
        self
    }

    pub fn state(mut self, state: DashboardState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn release_notes(mut self, notes: impl Into<String>) -> Self {
        self.release_notes = Some(notes.into());
        self
    }

    pub fn friendly_url(mut self, url: impl Into<String>) -> Self {
        self.friendly_url = Some(url.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.created_by = Some(user.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn build(self) -> BuilderResult<Dashboard> {
        let name = required_text("name", self.name)?;
        let topic_area_id = required_text("topic_area", self.topic_area_id)?;
        let created_by = required_text("created_by", self.created_by)?;
        let created_at = self.created_at.unwrap_or_else(Utc::now);

        let dashboard = Dashboard {
            id: self.id.unwrap_or_else(new_id),
            version: self.version.unwrap_or(1),
            parent_dashboard_id: self.parent_dashboard_id,
            name: name.trim().to_string(),
            topic_area_id,
            topic_area_name: self.topic_area_name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            display_table_of_contents: self.display_table_of_contents,
            table_of_contents: self.table_of_contents,
            state: self.state.unwrap_or(DashboardState::Draft),
            release_notes: self.release_notes,
            friendly_url: self.friendly_url,
            language: self.language.unwrap_or_default(),
            created_by,
            updated_by: None,
            created_at,
            updated_at: Utc::now(),
        };
        dashboard.validate()?;
        Ok(dashboard)
    }

    pub fn save<R: ItemRepository>(self, repo: &ContentRepository<R>) -> BuilderResult<Dashboard> {
        let dashboard = self.build()?;
        repo.save_dashboard(&dashboard)?;
        Ok(dashboard)
    }
}
