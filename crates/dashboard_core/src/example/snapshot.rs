//! In-memory dashboard graph reconstructed from example assets.

use crate::model::dashboard::Dashboard;
use crate::model::dataset::Dataset;
use crate::model::widget::Widget;

/// One dataset plus the example keys its data files were found under.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSnapshot {
    pub dataset: Dataset,
    /// Examples-bucket key of the raw (CSV) rendition.
    pub raw_source: Option<String>,
    /// Examples-bucket key of the JSON rendition.
    pub json_source: Option<String>,
}

/// A dashboard together with everything it references.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub dashboard: Dashboard,
    /// Ordered by `order ASC, id ASC`.
    pub widgets: Vec<Widget>,
    pub datasets: Vec<DatasetSnapshot>,
}

impl DashboardSnapshot {
    pub fn dataset(&self, id: &str) -> Option<&DatasetSnapshot> {
        self.datasets.iter().find(|entry| entry.dataset.id == id)
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|widget| widget.id == id)
    }

    /// Widgets of a section, in the section's declared order.
    pub fn section_children(&self, section_id: &str) -> Vec<&Widget> {
        match self.widget(section_id) {
            Some(section) => section
                .child_widget_ids()
                .into_iter()
                .filter_map(|id| self.widget(id))
                .collect(),
            None => Vec::new(),
        }
    }
}
