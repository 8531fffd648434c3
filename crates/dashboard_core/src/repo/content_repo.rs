//! Typed content repository over the document table.
//!
//! # Responsibility
//! - Map dashboards, widgets, datasets and topic areas to `(pk, sk)` items.
//! - Validate records on every write and every read.
//!
//! # Invariants
//! - Dashboard: `pk = sk = Dashboard#{id}`.
//! - Widget: `pk = Dashboard#{dashboard_id}`, `sk = Widget#{id}`.
//! - Dataset: `pk = sk = Dataset#{id}`; topic area: `pk = sk = TopicArea#{id}`.
//! - Widget listings are ordered by `order ASC, id ASC`.

use crate::model::dashboard::Dashboard;
use crate::model::dataset::Dataset;
use crate::model::topic_area::TopicArea;
use crate::model::widget::Widget;
use crate::model::ModelValidationError;
use crate::repo::item_repo::{Item, ItemRepository, RepoError, RepoResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DASHBOARD_PREFIX: &str = "Dashboard#";
pub const WIDGET_PREFIX: &str = "Widget#";
pub const DATASET_PREFIX: &str = "Dataset#";
pub const TOPIC_AREA_PREFIX: &str = "TopicArea#";

pub const ITEM_TYPE_DASHBOARD: &str = "Dashboard";
pub const ITEM_TYPE_WIDGET: &str = "Widget";
pub const ITEM_TYPE_DATASET: &str = "Dataset";
pub const ITEM_TYPE_TOPIC_AREA: &str = "TopicArea";

pub fn dashboard_key(id: &str) -> String {
    format!("{DASHBOARD_PREFIX}{id}")
}

pub fn widget_key(id: &str) -> String {
    format!("{WIDGET_PREFIX}{id}")
}

pub fn dataset_key(id: &str) -> String {
    format!("{DATASET_PREFIX}{id}")
}

pub fn topic_area_key(id: &str) -> String {
    format!("{TOPIC_AREA_PREFIX}{id}")
}

/// Content persistence facade used by builders and services.
pub struct ContentRepository<R: ItemRepository> {
    items: R,
}

impl<R: ItemRepository> ContentRepository<R> {
    pub fn new(items: R) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &R {
        &self.items
    }

    pub fn save_topic_area(&self, topic_area: &TopicArea) -> RepoResult<()> {
        topic_area.validate()?;
        let key = topic_area_key(&topic_area.id);
        self.put(key.clone(), key, ITEM_TYPE_TOPIC_AREA, topic_area)
    }

    pub fn get_topic_area(&self, id: &str) -> RepoResult<Option<TopicArea>> {
        let key = topic_area_key(id);
        let topic_area: Option<TopicArea> = self.get(&key, &key)?;
        topic_area.map(checked(TopicArea::validate)).transpose()
    }

    /// Lists topic areas ordered by name.
    pub fn list_topic_areas(&self) -> RepoResult<Vec<TopicArea>> {
        let mut topic_areas: Vec<TopicArea> = self.list_type(ITEM_TYPE_TOPIC_AREA)?;
        for topic_area in &topic_areas {
            topic_area.validate()?;
        }
        topic_areas.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(topic_areas)
    }

    /// Finds a topic area by name, ignoring case and surrounding whitespace.
    pub fn find_topic_area_by_name(&self, name: &str) -> RepoResult<Option<TopicArea>> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .list_topic_areas()?
            .into_iter()
            .find(|topic_area| topic_area.name.trim().to_lowercase() == wanted))
    }

    pub fn save_dashboard(&self, dashboard: &Dashboard) -> RepoResult<()> {
        dashboard.validate()?;
        let key = dashboard_key(&dashboard.id);
        self.put(key.clone(), key, ITEM_TYPE_DASHBOARD, dashboard)
    }

    pub fn get_dashboard(&self, id: &str) -> RepoResult<Option<Dashboard>> {
        let key = dashboard_key(id);
        let dashboard: Option<Dashboard> = self.get(&key, &key)?;
        dashboard.map(checked(Dashboard::validate)).transpose()
    }

    /// Lists dashboards ordered by name.
    pub fn list_dashboards(&self) -> RepoResult<Vec<Dashboard>> {
        let mut dashboards: Vec<Dashboard> = self.list_type(ITEM_TYPE_DASHBOARD)?;
        for dashboard in &dashboards {
            dashboard.validate()?;
        }
        dashboards.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(dashboards)
    }

    pub fn find_dashboards_by_name(&self, name: &str) -> RepoResult<Vec<Dashboard>> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .list_dashboards()?
            .into_iter()
            .filter(|dashboard| dashboard.name.trim().to_lowercase() == wanted)
            .collect())
    }

    /// Deletes a dashboard together with all of its widgets.
    pub fn delete_dashboard(&self, id: &str) -> RepoResult<()> {
        let pk = dashboard_key(id);
        for item in self.items.query(&pk, None)? {
            self.items.delete_item(&item.pk, &item.sk)?;
        }
        Ok(())
    }

    pub fn save_widget(&self, widget: &Widget) -> RepoResult<()> {
        widget.validate()?;
        self.put(
            dashboard_key(&widget.dashboard_id),
            widget_key(&widget.id),
            ITEM_TYPE_WIDGET,
            widget,
        )
    }

    pub fn get_widget(&self, dashboard_id: &str, widget_id: &str) -> RepoResult<Option<Widget>> {
        let widget: Option<Widget> =
            self.get(&dashboard_key(dashboard_id), &widget_key(widget_id))?;
        widget.map(checked(Widget::validate)).transpose()
    }

    pub fn list_widgets(&self, dashboard_id: &str) -> RepoResult<Vec<Widget>> {
        let items = self
            .items
            .query(&dashboard_key(dashboard_id), Some(WIDGET_PREFIX))?;
        let mut widgets = Vec::with_capacity(items.len());
        for item in items {
            let widget: Widget = decode(item)?;
            widget.validate()?;
            widgets.push(widget);
        }
        widgets.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(widgets)
    }

    pub fn save_dataset(&self, dataset: &Dataset) -> RepoResult<()> {
        dataset.validate()?;
        let key = dataset_key(&dataset.id);
        self.put(key.clone(), key, ITEM_TYPE_DATASET, dataset)
    }

    pub fn get_dataset(&self, id: &str) -> RepoResult<Option<Dataset>> {
        let key = dataset_key(id);
        let dataset: Option<Dataset> = self.get(&key, &key)?;
        dataset.map(checked(Dataset::validate)).transpose()
    }

    pub fn list_datasets(&self) -> RepoResult<Vec<Dataset>> {
        let datasets: Vec<Dataset> = self.list_type(ITEM_TYPE_DATASET)?;
        for dataset in &datasets {
            dataset.validate()?;
        }
        Ok(datasets)
    }

    fn put<T: Serialize>(
        &self,
        pk: String,
        sk: String,
        item_type: &str,
        record: &T,
    ) -> RepoResult<()> {
        let data = serde_json::to_value(record).map_err(|err| {
            RepoError::InvalidData(format!("cannot encode {item_type} {sk}: {err}"))
        })?;
        self.items.put_item(&Item {
            pk,
            sk,
            item_type: item_type.to_string(),
            data,
        })
    }

    fn get<T: DeserializeOwned>(&self, pk: &str, sk: &str) -> RepoResult<Option<T>> {
        self.items.get_item(pk, sk)?.map(decode).transpose()
    }

    fn list_type<T: DeserializeOwned>(&self, item_type: &str) -> RepoResult<Vec<T>> {
        self.items
            .list_by_type(item_type)?
            .into_iter()
            .map(decode)
            .collect()
    }
}

fn decode<T: DeserializeOwned>(item: Item) -> RepoResult<T> {
    serde_json::from_value(item.data).map_err(|err| {
        RepoError::InvalidData(format!(
            "{} item pk={} sk={} does not decode: {err}",
            item.item_type, item.pk, item.sk
        ))
    })
}

fn checked<T>(
    validate: impl Fn(&T) -> Result<(), ModelValidationError>,
) -> impl Fn(T) -> RepoResult<T> {
    move |record| {
        validate(&record)?;
        Ok(record)
    }
}
