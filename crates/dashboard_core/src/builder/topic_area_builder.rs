use super::{new_id, required_text, BuilderResult};
use crate::model::topic_area::TopicArea;
use crate::repo::content_repo::ContentRepository;
use crate::repo::item_repo::ItemRepository;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct TopicAreaBuilder {
    id: Option<String>,
    name: Option<String>,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl TopicAreaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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

    pub fn build(self) -> BuilderResult<TopicArea> {
        let name = required_text("name", self.name)?;
        let created_by = required_text("created_by", self.created_by)?;
        let created_at = self.created_at.unwrap_or_else(Utc::now);

        let topic_area = TopicArea {
            id: self.id.unwrap_or_else(new_id),
            name: name.trim().to_string(),
            created_by,
            created_at,
            updated_at: created_at,
        };
        topic_area.validate()?;
        Ok(topic_area)
    }

    pub fn save<R: ItemRepository>(self, repo: &ContentRepository<R>) -> BuilderResult<TopicArea> {
        let topic_area = self.build()?;
        repo.save_topic_area(&topic_area)?;
        Ok(topic_area)
    }
}

#[cfg(test)]
mod tests {
    use super::TopicAreaBuilder;
    use crate::builder::BuilderError;

    #[test]
    fn missing_name_is_reported_before_missing_creator() {
        let err = TopicAreaBuilder::new().build().unwrap_err();
        assert!(matches!(err, BuilderError::MissingField("name")));

        let err = TopicAreaBuilder::new().name("Health").build().unwrap_err();
        assert!(matches!(err, BuilderError::MissingField("created_by")));
    }

    #[test]
    fn build_trims_name_and_generates_id() {
        let topic_area = TopicAreaBuilder::new()
            .name("  Health  ")
            .created_by("admin")
            .build()
            .unwrap();
        assert_eq!(topic_area.name, "Health");
        assert!(!topic_area.id.is_empty());
    }
}
