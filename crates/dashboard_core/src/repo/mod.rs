//! Repository layer over the SQLite document store.
//!
//! # Responsibility
//! - Define data access contracts (`ItemRepository`, `ImportLedger`).
//! - Isolate SQL and key-layout details from builders and services.
//!
//! # Invariants
//! - Typed writes call the record's `validate()` before persistence.

pub mod content_repo;
pub mod import_ledger;
pub mod item_repo;
