//! Fluent builders for content records.
//!
//! # Responsibility
//! - Collect record fields through chained setters.
//! - Fail fast on missing required fields before touching storage.
//! - Persist through `ContentRepository` in the final `save` call.
//!
//! # Invariants
//! - `build()` never performs I/O.
//! - Missing fields are reported in declaration order, one at a time.
//! - Ids default to fresh UUID v4 strings; timestamps default to now.

mod dashboard_builder;
mod dataset_builder;
mod topic_area_builder;
mod widget_builder;

pub use dashboard_builder::DashboardBuilder;
pub use dataset_builder::DatasetBuilder;
pub use topic_area_builder::TopicAreaBuilder;
pub use widget_builder::WidgetBuilder;

use crate::model::ModelValidationError;
use crate::repo::item_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type BuilderResult<T> = Result<T, BuilderError>;

#[derive(Debug)]
pub enum BuilderError {
    /// A required setter was never called (or called with blank text).
    MissingField(&'static str),
    /// All fields are present but the record is inconsistent.
    Invalid(ModelValidationError),
    /// Persistence failed in `save`.
    Repo(RepoError),
}

impl Display for BuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BuilderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingField(_) => None,
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ModelValidationError> for BuilderError {
    fn from(value: ModelValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for BuilderError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> BuilderResult<T> {
    value.ok_or(BuilderError::MissingField(field))
}

fn required_text(field: &'static str, value: Option<String>) -> BuilderResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(BuilderError::MissingField(field)),
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
