//! Examples bucket scanning and graph reconstruction.
//!
//! # Responsibility
//! - Group a flat key list into per-dashboard layouts by prefix.
//! - Decode layout assets into a `DashboardSnapshot`, linking datasets to
//!   data files and widgets to datasets by file-name suffix.
//!
//! # Invariants
//! - Layouts are returned in key order; keys inside a layout stay sorted.
//! - A data file is claimed by at most one dataset.
//! - Dataset ids are unique within one snapshot.
//! - Snapshot widgets always carry the snapshot dashboard id.

use crate::example::layout::{
    dashboard_prefix, file_extension, file_name, file_stem, language_prefix,
    matches_file_suffix, ExampleKey, ExampleKeyKind,
};
use crate::example::snapshot::{DashboardSnapshot, DatasetSnapshot};
use crate::example::{ExampleError, ExampleResult};
use crate::model::dashboard::Dashboard;
use crate::model::dataset::{Dataset, DatasetKeys, SourceType};
use crate::model::widget::{Widget, CONTENT_DATASET_ID};
use crate::storage::ObjectStore;
use chrono::Utc;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Keys belonging to one example dashboard directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleLayout {
    pub language: String,
    pub dashboard_dir: String,
    pub dashboard_key: Option<String>,
    pub widget_keys: Vec<String>,
    pub dataset_keys: Vec<String>,
    pub data_keys: Vec<String>,
    /// Keys under the directory that match no asset kind.
    pub ignored_keys: Vec<String>,
}

impl ExampleLayout {
    pub fn prefix(&self) -> String {
        dashboard_prefix(&self.language, &self.dashboard_dir)
    }

    pub fn is_complete(&self) -> bool {
        self.dashboard_key.is_some()
    }
}

/// All example dashboards found for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleCatalog {
    pub language: String,
    pub layouts: Vec<ExampleLayout>,
    /// Keys under the language prefix outside any dashboard directory.
    pub ignored_keys: Vec<String>,
}

impl ExampleCatalog {
    pub fn layout(&self, dashboard_dir: &str) -> Option<&ExampleLayout> {
        self.layouts
            .iter()
            .find(|layout| layout.dashboard_dir == dashboard_dir)
    }
}

/// Groups flat keys into per-dashboard layouts. Keys of other languages are
/// dropped.
pub fn group_keys<'a>(language: &str, keys: impl IntoIterator<Item = &'a str>) -> ExampleCatalog {
    let prefix = language_prefix(language);
    let mut sorted: Vec<&str> = keys
        .into_iter()
        .filter(|key| key.starts_with(&prefix))
        .collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut layouts: BTreeMap<String, ExampleLayout> = BTreeMap::new();
    let mut ignored_keys = Vec::new();

    for key in sorted {
        let parsed = ExampleKey::parse(key);
        if parsed.dashboard_dir.is_empty() {
            ignored_keys.push(parsed.key);
            continue;
        }

        let layout = layouts
            .entry(parsed.dashboard_dir.clone())
            .or_insert_with(|| ExampleLayout {
                language: language.to_string(),
                dashboard_dir: parsed.dashboard_dir.clone(),
                ..ExampleLayout::default()
            });

        match parsed.kind {
            ExampleKeyKind::Dashboard => layout.dashboard_key = Some(parsed.key),
            ExampleKeyKind::Widget => layout.widget_keys.push(parsed.key),
            ExampleKeyKind::Dataset => layout.dataset_keys.push(parsed.key),
            ExampleKeyKind::Data => layout.data_keys.push(parsed.key),
            ExampleKeyKind::Unknown => layout.ignored_keys.push(parsed.key),
        }
    }

    ExampleCatalog {
        language: language.to_string(),
        layouts: layouts.into_values().collect(),
        ignored_keys,
    }
}

/// Lists `{language}/` keys of `bucket` and groups them into layouts.
pub fn scan_examples<S: ObjectStore>(
    store: &S,
    bucket: &str,
    language: &str,
) -> ExampleResult<ExampleCatalog> {
    let keys = store.list_keys(bucket, &language_prefix(language))?;
    let catalog = group_keys(language, keys.iter().map(String::as_str));
    info!(
        "event=examples_scan module=example status=ok bucket={} language={} keys={} dashboards={}",
        bucket,
        language,
        keys.len(),
        catalog.layouts.len()
    );
    Ok(catalog)
}

/// Reads one layout's assets and reconstructs its object graph.
pub fn load_snapshot<S: ObjectStore>(
    store: &S,
    bucket: &str,
    layout: &ExampleLayout,
) -> ExampleResult<DashboardSnapshot> {
    let dashboard_key = layout
        .dashboard_key
        .as_deref()
        .ok_or_else(|| ExampleError::MissingDashboard {
            prefix: layout.prefix(),
        })?;

    let mut dashboard: Dashboard = read_json(store, bucket, dashboard_key)?;
    if dashboard.id.trim().is_empty() {
        dashboard.id = layout.dashboard_dir.clone();
    }
    if dashboard.language.trim().is_empty() {
        dashboard.language = layout.language.clone();
    }

    let mut widgets = Vec::with_capacity(layout.widget_keys.len());
    for key in &layout.widget_keys {
        let mut widget: Widget = read_json(store, bucket, key)?;
        if widget.id.trim().is_empty() {
            widget.id = file_stem(key).to_string();
        }
        widget.dashboard_id = dashboard.id.clone();
        widgets.push(widget);
    }
    widgets.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

    let mut descriptors = Vec::with_capacity(layout.dataset_keys.len());
    for key in &layout.dataset_keys {
        let mut dataset: Dataset = read_json(store, bucket, key)?;
        if dataset.id.trim().is_empty() {
            dataset.id = file_stem(key).to_string();
        }
        descriptors.push(dataset);
    }

    let datasets = match_datasets(descriptors, &layout.data_keys)?;
    link_widgets_to_datasets(&mut widgets, &datasets)?;

    Ok(DashboardSnapshot {
        dashboard,
        widgets,
        datasets,
    })
}

/// Pairs dataset descriptors with data keys and infers datasets for
/// leftover data files that share a stem. Dataset ids must be unique.
pub fn match_datasets(
    descriptors: Vec<Dataset>,
    data_keys: &[String],
) -> ExampleResult<Vec<DatasetSnapshot>> {
    let mut claimed: BTreeSet<&str> = BTreeSet::new();
    let mut datasets = Vec::with_capacity(descriptors.len());

    for mut dataset in descriptors {
        if dataset.s3_key.json.is_empty() {
            dataset.s3_key = infer_keys_from_stem(&dataset.id, data_keys);
        }

        let json_source = claim(&dataset.s3_key.json, data_keys, &mut claimed);
        let raw_source = claim(&dataset.s3_key.raw, data_keys, &mut claimed);
        if json_source.is_none() {
            return Err(ExampleError::MissingDataFile {
                dataset_id: dataset.id,
                reference: dataset.s3_key.json,
            });
        }
        if raw_source.is_none() && !dataset.s3_key.raw.is_empty() {
            warn!(
                "event=dataset_match module=example status=partial dataset_id={} missing_raw={}",
                dataset.id, dataset.s3_key.raw
            );
        }

        datasets.push(DatasetSnapshot {
            dataset,
            raw_source,
            json_source,
        });
    }

    let mut by_stem: BTreeMap<&str, (Option<&str>, Option<&str>)> = BTreeMap::new();
    for key in data_keys {
        if claimed.contains(key.as_str()) {
            continue;
        }
        let entry = by_stem.entry(file_stem(key)).or_default();
        match file_extension(key).as_deref() {
            Some("json") => entry.1 = Some(key.as_str()),
            _ => entry.0 = Some(key.as_str()),
        }
    }

    for (stem, (raw, json)) in by_stem {
        let Some(json) = json else {
            warn!(
                "event=dataset_match module=example status=skipped reason=no_json_rendition stem={}",
                stem
            );
            continue;
        };
        let now = Utc::now();
        let dataset = Dataset {
            id: stem.to_string(),
            name: stem.to_string(),
            file_name: file_name_of(raw.unwrap_or(json)),
            s3_key: DatasetKeys {
                raw: raw.map(file_name_of).unwrap_or_default(),
                json: file_name_of(json),
            },
            source_type: SourceType::StaticDataset,
            schema: None,
            created_by: String::new(),
            created_at: now,
            updated_at: now,
        };
        datasets.push(DatasetSnapshot {
            dataset,
            raw_source: raw.map(str::to_string),
            json_source: Some(json.to_string()),
        });
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for entry in &datasets {
        if !seen.insert(entry.dataset.id.as_str()) {
            return Err(ExampleError::DuplicateDataset(entry.dataset.id.clone()));
        }
    }

    Ok(datasets)
}

/// Fills missing `datasetId` from `s3Key.json` and checks every dataset
/// reference resolves inside the snapshot.
pub fn link_widgets_to_datasets(
    widgets: &mut [Widget],
    datasets: &[DatasetSnapshot],
) -> ExampleResult<()> {
    for widget in widgets.iter_mut() {
        if let Some(dataset_id) = widget.dataset_id() {
            if datasets.iter().any(|entry| entry.dataset.id == dataset_id) {
                continue;
            }
            return Err(ExampleError::UnresolvedDataset {
                widget_id: widget.id.clone(),
                reference: dataset_id.to_string(),
            });
        }

        let Some(json_key) = widget.dataset_json_key().map(str::to_string) else {
            continue;
        };
        let matched = datasets
            .iter()
            .find(|entry| matches_file_suffix(&entry.dataset.s3_key.json, &json_key));
        match matched {
            Some(entry) => {
                if let Some(content) = widget.content.as_object_mut() {
                    content.insert(
                        CONTENT_DATASET_ID.to_string(),
                        Value::String(entry.dataset.id.clone()),
                    );
                }
            }
            None => {
                return Err(ExampleError::UnresolvedDataset {
                    widget_id: widget.id.clone(),
                    reference: json_key,
                });
            }
        }
    }
    Ok(())
}

fn claim<'k>(
    reference: &str,
    data_keys: &'k [String],
    claimed: &mut BTreeSet<&'k str>,
) -> Option<String> {
    if reference.is_empty() {
        return None;
    }
    let key = data_keys
        .iter()
        .find(|key| !claimed.contains(key.as_str()) && matches_file_suffix(key, reference))?;
    claimed.insert(key.as_str());
    Some(key.clone())
}

fn infer_keys_from_stem(stem: &str, data_keys: &[String]) -> DatasetKeys {
    let mut keys = DatasetKeys::default();
    for key in data_keys.iter().filter(|key| file_stem(key) == stem) {
        match file_extension(key).as_deref() {
            Some("json") => keys.json = file_name_of(key),
            _ => keys.raw = file_name_of(key),
        }
    }
    keys
}

fn file_name_of(key: &str) -> String {
    file_name(key).to_string()
}

fn read_json<S: ObjectStore, T: DeserializeOwned>(
    store: &S,
    bucket: &str,
    key: &str,
) -> ExampleResult<T> {
    let body = store.get_object(bucket, key)?;
    serde_json::from_slice(&body).map_err(|err| ExampleError::MalformedAsset {
        key: key.to_string(),
        reason: err.to_string(),
    })
}
