//! Dashboard authoring use-case service.
//!
//! # Responsibility
//! - Create draft dashboards and append widgets in display order.
//! - Keep section children and the table of contents in sync with widgets.
//! - Drive the publish lifecycle.
//!
//! # Invariants
//! - New widgets get `order = max(order) + 1` within their dashboard.
//! - A widget placed in a section is listed in that section's `widgetIds`.
//! - Published dashboards always carry a `friendly_url`.

use crate::builder::{BuilderError, DashboardBuilder, WidgetBuilder};
use crate::example::layout::slugify;
use crate::model::dashboard::{Dashboard, DashboardState};
use crate::model::widget::{Widget, WidgetType};
use crate::repo::content_repo::ContentRepository;
use crate::repo::item_repo::{ItemRepository, RepoError};
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Builder(BuilderError),
    DashboardNotFound(String),
    TopicAreaNotFound(String),
    /// Section id does not name a section widget of the same dashboard.
    SectionNotFound {
        dashboard_id: String,
        section_id: String,
    },
    InvalidTransition {
        from: DashboardState,
        to: DashboardState,
    },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Builder(err) => write!(f, "{err}"),
            Self::DashboardNotFound(id) => write!(f, "dashboard not found: {id}"),
            Self::TopicAreaNotFound(id) => write!(f, "topic area not found: {id}"),
            Self::SectionNotFound {
                dashboard_id,
                section_id,
            } => write!(
                f,
                "section {section_id} not found on dashboard {dashboard_id}"
            ),
            Self::InvalidTransition { from, to } => write!(
                f,
                "dashboard cannot move from {} to {}",
                from.as_str(),
                to.as_str()
            ),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Builder(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<BuilderError> for ServiceError {
    fn from(value: BuilderError) -> Self {
        Self::Builder(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct DashboardService<R: ItemRepository> {
    repo: ContentRepository<R>,
}

impl<R: ItemRepository> DashboardService<R> {
    pub fn new(repo: ContentRepository<R>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &ContentRepository<R> {
        &self.repo
    }

    /// Creates a draft dashboard under an existing topic area.
    pub fn create_draft(
        &self,
        name: &str,
        topic_area_id: &str,
        description: &str,
        actor: &str,
    ) -> ServiceResult<Dashboard> {
        let topic_area = self
            .repo
            .get_topic_area(topic_area_id)?
            .ok_or_else(|| ServiceError::TopicAreaNotFound(topic_area_id.to_string()))?;

        let dashboard = DashboardBuilder::new()
            .name(name)
            .topic_area(&topic_area)
            .description(description)
            .created_by(actor)
            .save(&self.repo)?;
        info!(
            "event=dashboard_create module=service status=ok dashboard_id={}",
            dashboard.id
        );
        Ok(dashboard)
    }

    pub fn get_dashboard(&self, id: &str) -> ServiceResult<Dashboard> {
        self.repo
            .get_dashboard(id)?
            .ok_or_else(|| ServiceError::DashboardNotFound(id.to_string()))
    }

    pub fn list_by_topic_area(&self, topic_area_id: &str) -> ServiceResult<Vec<Dashboard>> {
        Ok(self
            .repo
            .list_dashboards()?
            .into_iter()
            .filter(|dashboard| dashboard.topic_area_id == topic_area_id)
            .collect())
    }

    /// Appends a widget at the end of the dashboard.
    ///
    /// `widget` needs name, type and content; dashboard id and order are set
    /// here. Section widgets are added to the table of contents.
    pub fn add_widget(
        &self,
        dashboard_id: &str,
        widget: WidgetBuilder,
        section_id: Option<&str>,
    ) -> ServiceResult<Widget> {
        let mut dashboard = self.get_dashboard(dashboard_id)?;
        let existing = self.repo.list_widgets(dashboard_id)?;
        let next_order = existing
            .iter()
            .map(|widget| widget.order + 1)
            .max()
            .unwrap_or(0);

        let mut section = match section_id {
            Some(section_id) => Some(
                existing
                    .iter()
                    .find(|widget| {
                        widget.id == section_id && widget.widget_type == WidgetType::Section
                    })
                    .cloned()
                    .ok_or_else(|| ServiceError::SectionNotFound {
                        dashboard_id: dashboard_id.to_string(),
                        section_id: section_id.to_string(),
                    })?,
            ),
            None => None,
        };

        let mut builder = widget.dashboard_id(dashboard_id).order(next_order);
        if let Some(section) = &section {
            builder = builder.section(section.id.clone());
        }
        let widget = builder.save(&self.repo)?;

        if let Some(section) = section.as_mut() {
            section.push_child_widget_id(&widget.id);
            section.updated_at = Utc::now();
            self.repo.save_widget(section)?;
        }

        if widget.widget_type == WidgetType::Section {
            dashboard.table_of_contents.insert(widget.id.clone(), true);
        }
        dashboard.updated_at = Utc::now();
        self.repo.save_dashboard(&dashboard)?;

        Ok(widget)
    }

    /// Moves a dashboard to `next`, stamping `updated_by`.
    pub fn transition(
        &self,
        dashboard_id: &str,
        next: DashboardState,
        actor: &str,
    ) -> ServiceResult<Dashboard> {
        let mut dashboard = self.get_dashboard(dashboard_id)?;
        if !dashboard.state.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition {
                from: dashboard.state,
                to: next,
            });
        }

        let previous = dashboard.state;
        dashboard.state = next;
        dashboard.updated_by = Some(actor.to_string());
        dashboard.updated_at = Utc::now();
        if next == DashboardState::Published && dashboard.friendly_url.is_none() {
            dashboard.friendly_url = Some(slugify(&dashboard.name));
        }
        self.repo.save_dashboard(&dashboard)?;

        info!(
            "event=dashboard_transition module=service status=ok dashboard_id={} from={} to={}",
            dashboard.id,
            previous.as_str(),
            next.as_str()
        );
        Ok(dashboard)
    }

    pub fn submit_for_publishing(&self, dashboard_id: &str, actor: &str) -> ServiceResult<Dashboard> {
        self.transition(dashboard_id, DashboardState::PublishPending, actor)
    }

    pub fn publish(&self, dashboard_id: &str, actor: &str) -> ServiceResult<Dashboard> {
        self.transition(dashboard_id, DashboardState::Published, actor)
    }

    pub fn archive(&self, dashboard_id: &str, actor: &str) -> ServiceResult<Dashboard> {
        self.transition(dashboard_id, DashboardState::Archived, actor)
    }

    pub fn return_to_draft(&self, dashboard_id: &str, actor: &str) -> ServiceResult<Dashboard> {
        self.transition(dashboard_id, DashboardState::Draft, actor)
    }
}
