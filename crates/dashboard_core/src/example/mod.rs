//! Example-content pipeline.
//!
//! # Responsibility
//! - Scan an examples bucket by key-prefix convention (`layout`, `catalog`).
//! - Rebuild dashboard/widget/dataset graphs from flat key lists (`catalog`).
//! - Rewrite ids consistently across one dashboard graph (`rewrite`).
//!
//! Persistence of rebuilt graphs lives in `service::example_service`.

pub mod catalog;
pub mod layout;
pub mod rewrite;
pub mod snapshot;

use crate::builder::BuilderError;
use crate::repo::item_repo::RepoError;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ExampleResult<T> = Result<T, ExampleError>;

#[derive(Debug)]
pub enum ExampleError {
    Storage(StorageError),
    Repo(RepoError),
    Builder(BuilderError),
    /// Asset exists but does not decode into the expected record.
    MalformedAsset { key: String, reason: String },
    /// Example directory has no `dashboard.json`.
    MissingDashboard { prefix: String },
    /// Dataset has no matching data file for one of its renditions.
    MissingDataFile { dataset_id: String, reference: String },
    /// Two datasets of one example share an id.
    DuplicateDataset(String),
    /// Widget references a dataset absent from the example.
    UnresolvedDataset { widget_id: String, reference: String },
    /// No example directory with this prefix exists.
    ExampleNotFound(String),
    DashboardNotFound(String),
    DatasetNotFound(String),
}

impl Display for ExampleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Builder(err) => write!(f, "{err}"),
            Self::MalformedAsset { key, reason } => {
                write!(f, "malformed example asset `{key}`: {reason}")
            }
            Self::MissingDashboard { prefix } => {
                write!(f, "example `{prefix}` has no dashboard.json")
            }
            Self::MissingDataFile {
                dataset_id,
                reference,
            } => write!(
                f,
                "dataset {dataset_id} has no data file matching `{reference}`"
            ),
            Self::DuplicateDataset(id) => {
                write!(f, "example defines dataset `{id}` more than once")
            }
            Self::UnresolvedDataset {
                widget_id,
                reference,
            } => write!(
                f,
                "widget {widget_id} references unknown dataset `{reference}`"
            ),
            Self::ExampleNotFound(prefix) => write!(f, "example not found: {prefix}"),
            Self::DashboardNotFound(id) => write!(f, "dashboard not found: {id}"),
            Self::DatasetNotFound(id) => write!(f, "dataset not found: {id}"),
        }
    }
}

impl Error for ExampleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Builder(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for ExampleError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<RepoError> for ExampleError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<BuilderError> for ExampleError {
    fn from(value: BuilderError) -> Self {
        Self::Builder(value)
    }
}
