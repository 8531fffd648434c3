//! Dashboard record and publish lifecycle.
//!
//! # Invariants
//! - `version` starts at 1 and is never 0.
//! - `table_of_contents` keys are widget ids of the same dashboard.
//! - State changes go through `DashboardState::can_transition_to`.

use super::{require_text, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Publish lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DashboardState {
    /// Editable working copy.
    Draft,
    /// Submitted for review before publishing.
    PublishPending,
    /// Publicly visible.
    Published,
    /// Removed from public view, kept for history.
    Archived,
    /// Superseded version of a published dashboard.
    Inactive,
}

impl DashboardState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PublishPending => "PublishPending",
            Self::Published => "Published",
            Self::Archived => "Archived",
            Self::Inactive => "Inactive",
        }
    }

    /// Returns whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: DashboardState) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::PublishPending)
                | (Self::PublishPending, Self::Published)
                | (Self::PublishPending, Self::Draft)
                | (Self::Published, Self::Archived)
                | (Self::Published, Self::Inactive)
                | (Self::Archived, Self::Published)
        )
    }
}

/// A named collection of widgets with a topic area and publish state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dashboard_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub topic_area_id: String,
    #[serde(default)]
    pub topic_area_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_table_of_contents: bool,
    /// Widget id -> shown in the table of contents.
    #[serde(default)]
    pub table_of_contents: BTreeMap<String, bool>,
    #[serde(default = "default_state")]
    pub state: DashboardState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_url: Option<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

fn default_state() -> DashboardState {
    DashboardState::Draft
}

impl Dashboard {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("dashboard", "id", &self.id)?;
        require_text("dashboard", "name", &self.name)?;
        require_text("dashboard", "topic_area_id", &self.topic_area_id)?;
        if self.version == 0 {
            return Err(ModelValidationError::InvalidVersion(self.version));
        }
        if self.parent_dashboard_id.as_deref() == Some(self.id.as_str()) {
            return Err(ModelValidationError::SelfReference {
                entity: "dashboard",
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    pub fn is_published(&self) -> bool {
        self.state == DashboardState::Published
    }
}
