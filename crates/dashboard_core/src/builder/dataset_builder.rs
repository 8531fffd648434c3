use super::{new_id, required_text, BuilderResult};
use crate::model::dataset::{Dataset, DatasetKeys, SourceType};
use crate::repo::content_repo::ContentRepository;
use crate::repo::item_repo::ItemRepository;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    id: Option<String>,
    name: Option<String>,
    file_name: Option<String>,
    s3_key: Option<DatasetKeys>,
    source_type: Option<SourceType>,
    schema: Option<Value>,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            id: Some(dataset.id.clone()),
            name: Some(dataset.name.clone()),
            file_name: Some(dataset.file_name.clone()),
            s3_key: Some(dataset.s3_key.clone()),
            source_type: Some(dataset.source_type),
            schema: dataset.schema.clone(),
            created_by: Some(dataset.created_by.clone()),
            created_at: Some(dataset.created_at),
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

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn s3_key(mut self, keys: DatasetKeys) -> Self {
        self.s3_key = Some(keys);
        self
    }

    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
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

    /// Builds the record. Without explicit keys, `{id}.csv` / `{id}.json`
    /// are used.
    pub fn build(self) -> BuilderResult<Dataset> {
        let name = required_text("name", self.name)?;
        let created_by = required_text("created_by", self.created_by)?;
        let id = self.id.unwrap_or_else(new_id);
        let s3_key = self
            .s3_key
            .unwrap_or_else(|| DatasetKeys::for_id(&id, "csv"));
        let created_at = self.created_at.unwrap_or_else(Utc::now);

        let dataset = Dataset {
            file_name: self.file_name.unwrap_or_else(|| name.clone()),
            id,
            name,
            s3_key,
            source_type: self.source_type.unwrap_or(SourceType::FileUpload),
            schema: self.schema,
            created_by,
            created_at,
            updated_at: Utc::now(),
        };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn save<R: ItemRepository>(self, repo: &ContentRepository<R>) -> BuilderResult<Dataset> {
        let dataset = self.build()?;
        repo.save_dataset(&dataset)?;
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::DatasetBuilder;
    use crate::builder::BuilderError;
    use crate::model::dataset::DatasetKeys;

    #[test]
    fn default_keys_follow_dataset_id() {
        let dataset = DatasetBuilder::new()
            .id("ds-1")
            .name("unemployment.csv")
            .created_by("admin")
            .build()
            .unwrap();
        assert_eq!(dataset.s3_key, DatasetKeys::for_id("ds-1", "csv"));
        assert_eq!(dataset.file_name, "unemployment.csv");
    }

    #[test]
    fn blank_name_counts_as_missing() {
        let err = DatasetBuilder::new()
            .name("   ")
            .created_by("admin")
            .build()
            .unwrap_err();
        assert!(matches!(err, BuilderError::MissingField("name")));
    }

    #[test]
    fn explicit_keys_without_json_are_invalid() {
        let err = DatasetBuilder::new()
            .name("x")
            .created_by("admin")
            .s3_key(DatasetKeys {
                raw: "x.csv".to_string(),
                json: String::new(),
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, BuilderError::Invalid(_)));
    }
}
