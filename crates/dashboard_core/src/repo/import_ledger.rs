//! Ledger of example layouts imported into the document store.
//!
//! # Invariants
//! - One row per `(source_prefix, dashboard_id)`; recording twice is a no-op.
//! - Rows are listed newest first.

use crate::repo::item_repo::RepoResult;
use rusqlite::{params, Connection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Examples bucket prefix the dashboard was imported from.
    pub source_prefix: String,
    pub dashboard_id: String,
    /// Epoch ms.
    pub imported_at: i64,
}

pub trait ImportLedger {
    fn record_import(&self, source_prefix: &str, dashboard_id: &str) -> RepoResult<()>;
    fn imports_for(&self, source_prefix: &str) -> RepoResult<Vec<ImportRecord>>;
}

pub struct SqliteImportLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteImportLedger<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ImportLedger for SqliteImportLedger<'_> {
    fn record_import(&self, source_prefix: &str, dashboard_id: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO example_imports (source_prefix, dashboard_id)
             VALUES (?1, ?2);",
            params![source_prefix, dashboard_id],
        )?;
        Ok(())
    }

    fn imports_for(&self, source_prefix: &str) -> RepoResult<Vec<ImportRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_prefix, dashboard_id, imported_at
             FROM example_imports
             WHERE source_prefix = ?1
             ORDER BY imported_at DESC, dashboard_id ASC;",
        )?;
        let rows = stmt.query_map([source_prefix], |row| {
            Ok(ImportRecord {
                source_prefix: row.get(0)?,
                dashboard_id: row.get(1)?,
                imported_at: row.get(2)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
