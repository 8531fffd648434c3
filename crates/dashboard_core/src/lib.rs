//! Core logic for the dashboard admin backend.
//! Owns the content model, the document table and the example-content
//! pipeline that seeds and exports sample dashboards.

pub mod builder;
pub mod config;
pub mod db;
pub mod example;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use builder::{BuilderError, DashboardBuilder, DatasetBuilder, TopicAreaBuilder, WidgetBuilder};
pub use config::{ConfigError, PipelineConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use example::catalog::{ExampleCatalog, ExampleLayout};
pub use example::rewrite::IdMap;
pub use example::{ExampleError, ExampleResult};
pub use logging::{default_log_level, init_logging};
pub use model::dashboard::{Dashboard, DashboardState};
pub use model::dataset::{Dataset, DatasetKeys, SourceType};
pub use model::topic_area::TopicArea;
pub use model::widget::{Widget, WidgetType};
pub use repo::content_repo::ContentRepository;
pub use repo::import_ledger::{ImportLedger, ImportRecord, SqliteImportLedger};
pub use repo::item_repo::{Item, ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use service::dashboard_service::{DashboardService, ServiceError};
pub use service::example_service::{ExampleService, ExportReport, ImportReport, SeedReport};
pub use storage::{FsObjectStore, MemoryObjectStore, ObjectStore, StorageError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
