//! Dashboard content domain model.
//!
//! # Responsibility
//! - Define the records stored in the document table and in example assets.
//! - Keep JSON field naming (`camelCase`) identical across both surfaces.
//!
//! # Invariants
//! - Records reference each other by string ids only; no record owns another.
//! - `validate()` is the single gate used by builders and repositories.

pub mod dashboard;
pub mod dataset;
pub mod topic_area;
pub mod widget;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for any content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is empty after trim.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// Dashboard versions start at 1.
    InvalidVersion(u32),
    /// Widget type requires content that is absent or malformed.
    InvalidContent {
        widget_id: String,
        reason: String,
    },
    /// Record points at itself where a different record is expected.
    SelfReference {
        entity: &'static str,
        id: String,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::InvalidVersion(version) => {
                write!(f, "dashboard version must be >= 1, got {version}")
            }
            Self::InvalidContent { widget_id, reason } => {
                write!(f, "widget {widget_id} has invalid content: {reason}")
            }
            Self::SelfReference { entity, id } => {
                write!(f, "{entity} {id} cannot reference itself")
            }
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::EmptyField { entity, field });
    }
    Ok(())
}
