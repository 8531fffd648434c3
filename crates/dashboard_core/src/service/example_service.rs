//! Example-content seed/export/import use cases.
//!
//! # Responsibility
//! - Import one example layout: rebuild, rewrite ids, copy data files and
//!   persist through the builders.
//! - Seed every example of a language, skipping ones already imported.
//! - Export a stored dashboard back into the examples bucket layout.
//!
//! # Invariants
//! - Imported dashboards start as `Draft` version 1 with no parent.
//! - Every record is built and validated before the first write.
//! - Dataset files are copied before any record is written.
//! - Export keeps ids; import always assigns fresh ones.

use crate::builder::{
    BuilderResult, DashboardBuilder, DatasetBuilder, TopicAreaBuilder, WidgetBuilder,
};
use crate::config::PipelineConfig;
use crate::example::catalog::{load_snapshot, scan_examples, ExampleCatalog, ExampleLayout};
use crate::example::layout::{dashboard_key, data_key, dataset_key, slugify, widget_key};
use crate::example::rewrite::{rewrite_snapshot, IdMap};
use crate::example::snapshot::DashboardSnapshot;
use crate::example::{ExampleError, ExampleResult};
use crate::model::dashboard::{Dashboard, DashboardState};
use crate::model::dataset::Dataset;
use crate::model::topic_area::TopicArea;
use crate::model::widget::Widget;
use crate::repo::content_repo::ContentRepository;
use crate::repo::import_ledger::ImportLedger;
use crate::repo::item_repo::ItemRepository;
use crate::storage::ObjectStore;
use chrono::Utc;
use log::{error, info};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;

/// Outcome of importing one example layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub source_prefix: String,
    pub dashboard_id: String,
    pub dashboard_name: String,
    pub topic_area_id: String,
    pub widget_count: usize,
    pub dataset_count: usize,
    /// Files copied into the datasets bucket.
    pub copied_keys: Vec<String>,
    pub ids: IdMap,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub imported: Vec<ImportReport>,
    /// Prefixes skipped because an earlier import still exists.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub prefix: String,
    pub written_keys: Vec<String>,
}

struct ImportRecords {
    topic_area: TopicArea,
    topic_area_is_new: bool,
    datasets: Vec<Dataset>,
    dashboard: Dashboard,
    widgets: Vec<Widget>,
}

pub struct ExampleService<R: ItemRepository, S: ObjectStore, L: ImportLedger> {
    repo: ContentRepository<R>,
    store: S,
    ledger: L,
    config: PipelineConfig,
}

impl<R: ItemRepository, S: ObjectStore, L: ImportLedger> ExampleService<R, S, L> {
    pub fn new(repo: ContentRepository<R>, store: S, ledger: L, config: PipelineConfig) -> Self {
        Self {
            repo,
            store,
            ledger,
            config,
        }
    }

    pub fn repository(&self) -> &ContentRepository<R> {
        &self.repo
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn list_examples(&self, language: &str) -> ExampleResult<ExampleCatalog> {
        scan_examples(&self.store, &self.config.examples_bucket, language)
    }

    /// Imports the example stored under `{language}/{dashboard_dir}/`.
    pub fn import_by_dir(&self, language: &str, dashboard_dir: &str) -> ExampleResult<ImportReport> {
        let catalog = self.list_examples(language)?;
        let layout = catalog
            .layout(dashboard_dir)
            .ok_or_else(|| ExampleError::ExampleNotFound(format!("{language}/{dashboard_dir}/")))?;
        self.import_example(layout)
    }

    pub fn import_example(&self, layout: &ExampleLayout) -> ExampleResult<ImportReport> {
        let started_at = Instant::now();
        let prefix = layout.prefix();
        info!("event=example_import module=example status=start prefix={prefix}");

        match self.import_inner(layout) {
            Ok(report) => {
                info!(
                    "event=example_import module=example status=ok prefix={} dashboard_id={} widgets={} datasets={} duration_ms={}",
                    prefix,
                    report.dashboard_id,
                    report.widget_count,
                    report.dataset_count,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=example_import module=example status=error prefix={} duration_ms={} error={}",
                    prefix,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn import_inner(&self, layout: &ExampleLayout) -> ExampleResult<ImportReport> {
        let snapshot = load_snapshot(&self.store, &self.config.examples_bucket, layout)?;
        let mut ids = IdMap::new();
        let rewritten = rewrite_snapshot(&snapshot, &mut ids);
        let records = self.build_records(layout, &rewritten)?;

        let copied_keys = self.copy_dataset_files(&rewritten)?;
        if records.topic_area_is_new {
            self.repo.save_topic_area(&records.topic_area)?;
            info!(
                "event=topic_area_create module=example status=ok topic_area_id={}",
                records.topic_area.id
            );
        }
        for dataset in &records.datasets {
            self.repo.save_dataset(dataset)?;
        }
        self.repo.save_dashboard(&records.dashboard)?;
        for widget in &records.widgets {
            self.repo.save_widget(widget)?;
        }

        self.ledger
            .record_import(&layout.prefix(), &records.dashboard.id)?;

        Ok(ImportReport {
            source_prefix: layout.prefix(),
            dashboard_id: records.dashboard.id,
            dashboard_name: records.dashboard.name,
            topic_area_id: records.topic_area.id,
            widget_count: records.widgets.len(),
            dataset_count: records.datasets.len(),
            copied_keys,
            ids,
        })
    }

    /// Builds every record of the import without writing anything.
    fn build_records(
        &self,
        layout: &ExampleLayout,
        snapshot: &DashboardSnapshot,
    ) -> ExampleResult<ImportRecords> {
        let (topic_area, topic_area_is_new) =
            self.resolve_topic_area(&snapshot.dashboard.topic_area_name)?;
        let now = Utc::now();

        let datasets = snapshot
            .datasets
            .iter()
            .map(|entry| {
                DatasetBuilder::from_dataset(&entry.dataset)
                    .created_by(self.config.actor.as_str())
                    .created_at(now)
                    .build()
            })
            .collect::<BuilderResult<Vec<_>>>()?;

        let mut dashboard = snapshot.dashboard.clone();
        dashboard.parent_dashboard_id = None;
        dashboard.friendly_url = None;
        dashboard.release_notes = None;
        let dashboard = DashboardBuilder::from_dashboard(&dashboard)
            .topic_area(&topic_area)
            .state(DashboardState::Draft)
            .version(1)
            .language(layout.language.as_str())
            .created_by(self.config.actor.as_str())
            .created_at(now)
            .build()?;

        let widgets = snapshot
            .widgets
            .iter()
            .map(|widget| WidgetBuilder::from_widget(widget).build())
            .collect::<BuilderResult<Vec<_>>>()?;

        Ok(ImportRecords {
            topic_area,
            topic_area_is_new,
            datasets,
            dashboard,
            widgets,
        })
    }

    fn copy_dataset_files(&self, snapshot: &DashboardSnapshot) -> ExampleResult<Vec<String>> {
        let mut copied = Vec::new();
        for entry in &snapshot.datasets {
            let keys = &entry.dataset.s3_key;
            let json_source =
                entry
                    .json_source
                    .as_deref()
                    .ok_or_else(|| ExampleError::MissingDataFile {
                        dataset_id: entry.dataset.id.clone(),
                        reference: keys.json.clone(),
                    })?;
            self.store.copy_object(
                &self.config.examples_bucket,
                json_source,
                &self.config.datasets_bucket,
                &keys.json,
            )?;
            copied.push(keys.json.clone());

            if let Some(raw_source) = entry.raw_source.as_deref() {
                if !keys.raw.is_empty() {
                    self.store.copy_object(
                        &self.config.examples_bucket,
                        raw_source,
                        &self.config.datasets_bucket,
                        &keys.raw,
                    )?;
                    copied.push(keys.raw.clone());
                }
            }
        }
        Ok(copied)
    }

    /// Finds the topic area by name or builds an unsaved one.
    fn resolve_topic_area(&self, name: &str) -> ExampleResult<(TopicArea, bool)> {
        let name = if name.trim().is_empty() {
            self.config.default_topic_area.as_str()
        } else {
            name.trim()
        };
        if let Some(existing) = self.repo.find_topic_area_by_name(name)? {
            return Ok((existing, false));
        }
        let topic_area = TopicAreaBuilder::new()
            .name(name)
            .created_by(self.config.actor.as_str())
            .build()?;
        Ok((topic_area, true))
    }

    /// Imports every complete example of `language`.
    ///
    /// A layout is skipped when the ledger holds an import of it whose
    /// dashboard still exists, unless `force` is set.
    pub fn seed_examples(&self, language: &str, force: bool) -> ExampleResult<SeedReport> {
        let catalog = self.list_examples(language)?;
        let mut report = SeedReport::default();

        for layout in catalog.layouts.iter().filter(|layout| layout.is_complete()) {
            if !force && self.already_imported(&layout.prefix())? {
                info!(
                    "event=example_seed module=example status=skipped prefix={}",
                    layout.prefix()
                );
                report.skipped.push(layout.prefix());
                continue;
            }
            report.imported.push(self.import_example(layout)?);
        }

        info!(
            "event=example_seed module=example status=ok language={} imported={} skipped={}",
            language,
            report.imported.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn already_imported(&self, prefix: &str) -> ExampleResult<bool> {
        for record in self.ledger.imports_for(prefix)? {
            if self.repo.get_dashboard(&record.dashboard_id)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Writes a stored dashboard into `{language}/{slug}/` of the examples
    /// bucket, copying the dataset files its widgets use.
    pub fn export_dashboard(&self, dashboard_id: &str, language: &str) -> ExampleResult<ExportReport> {
        let dashboard = self
            .repo
            .get_dashboard(dashboard_id)?
            .ok_or_else(|| ExampleError::DashboardNotFound(dashboard_id.to_string()))?;
        let widgets = self.repo.list_widgets(dashboard_id)?;

        let dataset_ids: BTreeSet<&str> = widgets.iter().filter_map(|w| w.dataset_id()).collect();
        let mut datasets: Vec<Dataset> = Vec::with_capacity(dataset_ids.len());
        for id in dataset_ids {
            let dataset = self
                .repo
                .get_dataset(id)?
                .ok_or_else(|| ExampleError::DatasetNotFound(id.to_string()))?;
            datasets.push(dataset);
        }

        let dir = slugify(&dashboard.name);
        let mut written = Vec::new();

        let key = dashboard_key(language, &dir);
        self.put_json(&key, &dashboard)?;
        written.push(key);

        for widget in &widgets {
            let key = widget_key(language, &dir, &widget.id);
            self.put_json(&key, widget)?;
            written.push(key);
        }

        for dataset in &datasets {
            let key = dataset_key(language, &dir, &dataset.id);
            self.put_json(&key, dataset)?;
            written.push(key);

            for file in dataset.s3_key.keys() {
                let key = data_key(language, &dir, file);
                self.store.copy_object(
                    &self.config.datasets_bucket,
                    file,
                    &self.config.examples_bucket,
                    &key,
                )?;
                written.push(key);
            }
        }

        info!(
            "event=example_export module=example status=ok dashboard_id={} prefix={}/{}/ keys={}",
            dashboard_id,
            language,
            dir,
            written.len()
        );
        Ok(ExportReport {
            prefix: format!("{language}/{dir}/"),
            written_keys: written,
        })
    }

    fn put_json<T: Serialize>(&self, key: &str, record: &T) -> ExampleResult<()> {
        let body = serde_json::to_vec_pretty(record).map_err(|err| ExampleError::MalformedAsset {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        self.store
            .put_object(&self.config.examples_bucket, key, &body)?;
        Ok(())
    }
}
