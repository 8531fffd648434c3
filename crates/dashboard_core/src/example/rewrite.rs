//! Identifier rewriting across one dashboard graph.
//!
//! # Responsibility
//! - Hold the `old id -> new id` map for one import.
//! - Apply it in a single substitution pass over dashboard, widgets,
//!   datasets, table of contents and section children.
//!
//! # Invariants
//! - `IdMap::assign` is stable: one old id always maps to one new id.
//! - Ids absent from the map are left untouched.
//! - Null JSON values are skipped, never replaced.

use crate::example::layout::file_extension;
use crate::example::snapshot::{DashboardSnapshot, DatasetSnapshot};
use crate::model::dataset::DatasetKeys;
use crate::model::widget::CONTENT_S3_KEY;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// `old id -> new id` substitution map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    ids: BTreeMap<String, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new id for `old`, generating a UUID v4 on first use.
    pub fn assign(&mut self, old: &str) -> String {
        self.assign_with(old, || Uuid::new_v4().to_string())
    }

    /// Like `assign`, with a caller-provided generator for first use.
    pub fn assign_with(&mut self, old: &str, generate: impl FnOnce() -> String) -> String {
        self.ids
            .entry(old.to_string())
            .or_insert_with(generate)
            .clone()
    }

    /// Pins a mapping. An existing mapping for `old` is replaced.
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.ids.insert(old.into(), new.into());
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.ids.get(old).map(String::as_str)
    }

    /// Mapped id, or `value` itself when unmapped.
    pub fn resolve<'a>(&'a self, value: &'a str) -> &'a str {
        self.get(value).unwrap_or(value)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ids.iter().map(|(old, new)| (old.as_str(), new.as_str()))
    }
}

/// Replaces every JSON string value that equals a mapped id. Object keys
/// are left alone.
///
/// Returns the number of substitutions made.
pub fn rewrite_json(value: &mut Value, ids: &IdMap) -> usize {
    match value {
        Value::String(text) => match ids.get(text) {
            Some(new) => {
                *text = new.to_string();
                1
            }
            None => 0,
        },
        Value::Array(items) => items.iter_mut().map(|item| rewrite_json(item, ids)).sum(),
        Value::Object(map) => map.values_mut().map(|item| rewrite_json(item, ids)).sum(),
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
    }
}

/// Dataset object keys derived from a (new) dataset id, keeping the raw
/// rendition's extension.
pub fn dataset_keys_for(new_id: &str, old: &DatasetKeys) -> DatasetKeys {
    let raw = if old.raw.is_empty() {
        String::new()
    } else {
        let extension = file_extension(&old.raw).unwrap_or_else(|| "csv".to_string());
        format!("{new_id}.{extension}")
    };
    DatasetKeys {
        raw,
        json: format!("{new_id}.json"),
    }
}

/// Assigns new ids to every entity of `snapshot` and returns the rewritten
/// copy. Mappings already present in `ids` are reused.
///
/// Source keys (`raw_source`, `json_source`) keep pointing at the original
/// example assets so the caller can copy them to the new dataset keys.
pub fn rewrite_snapshot(snapshot: &DashboardSnapshot, ids: &mut IdMap) -> DashboardSnapshot {
    ids.assign(&snapshot.dashboard.id);
    for widget in &snapshot.widgets {
        ids.assign(&widget.id);
    }
    for entry in &snapshot.datasets {
        ids.assign(&entry.dataset.id);
    }
    let ids: &IdMap = ids;

    let datasets: Vec<DatasetSnapshot> = snapshot
        .datasets
        .iter()
        .map(|entry| {
            let mut dataset = entry.dataset.clone();
            dataset.id = ids.resolve(&entry.dataset.id).to_string();
            dataset.s3_key = dataset_keys_for(&dataset.id, &entry.dataset.s3_key);
            DatasetSnapshot {
                dataset,
                raw_source: entry.raw_source.clone(),
                json_source: entry.json_source.clone(),
            }
        })
        .collect();

    let mut dashboard = snapshot.dashboard.clone();
    dashboard.id = ids.resolve(&snapshot.dashboard.id).to_string();
    dashboard.table_of_contents = snapshot
        .dashboard
        .table_of_contents
        .iter()
        .map(|(widget_id, shown)| (ids.resolve(widget_id).to_string(), *shown))
        .collect();

    let widgets = snapshot
        .widgets
        .iter()
        .map(|widget| {
            let mut widget = widget.clone();
            widget.id = ids.resolve(&widget.id).to_string();
            widget.dashboard_id = dashboard.id.clone();
            widget.section = widget
                .section
                .as_deref()
                .map(|section| ids.resolve(section).to_string());
            rewrite_json(&mut widget.content, ids);

            let new_keys = widget
                .dataset_id()
                .and_then(|id| datasets.iter().find(|entry| entry.dataset.id == id))
                .map(|entry| entry.dataset.s3_key.clone());
            if let (Some(keys), Some(content)) = (new_keys, widget.content.as_object_mut()) {
                content.insert(
                    CONTENT_S3_KEY.to_string(),
                    json!({ "raw": keys.raw, "json": keys.json }),
                );
            }
            widget
        })
        .collect();

    DashboardSnapshot {
        dashboard,
        widgets,
        datasets,
    }
}

#[cfg(test)]
mod tests {
    use super::{dataset_keys_for, rewrite_json, IdMap};
    use crate::model::dataset::DatasetKeys;
    use serde_json::json;

    #[test]
    fn assign_is_stable_for_repeated_keys() {
        let mut ids = IdMap::new();
        let first = ids.assign("old-1");
        let second = ids.assign("old-1");
        assert_eq!(first, second);
        assert_ne!(first, ids.assign("old-2"));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn rewrite_json_replaces_whole_values_only() {
        let mut ids = IdMap::new();
        ids.insert("w1", "n1");
        ids.insert("cases", "ds-new");
        let mut value = json!({
            "w1": true,
            "list": ["w1", "w10", null],
            "nested": { "ref": "w1", "count": 3 },
            "columnsMetadata": { "cases": { "hidden": false } }
        });

        let count = rewrite_json(&mut value, &ids);

        assert_eq!(count, 2);
        assert_eq!(
            value,
            json!({
                "w1": true,
                "list": ["n1", "w10", null],
                "nested": { "ref": "n1", "count": 3 },
                "columnsMetadata": { "cases": { "hidden": false } }
            })
        );
    }

    #[test]
    fn dataset_keys_keep_raw_extension() {
        let keys = dataset_keys_for(
            "new",
            &DatasetKeys {
                raw: "uploads/cases.xlsx".to_string(),
                json: "cases.json".to_string(),
            },
        );
        assert_eq!(keys.raw, "new.xlsx");
        assert_eq!(keys.json, "new.json");

        let json_only = dataset_keys_for("new", &DatasetKeys::default());
        assert_eq!(json_only.raw, "");
    }
}
