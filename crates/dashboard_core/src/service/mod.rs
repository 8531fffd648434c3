//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, builder and storage calls into use-case APIs.
//! - Keep the CLI decoupled from storage details.

pub mod dashboard_service;
pub mod example_service;
