//! Single-table document store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide key/value style access over the `items` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Items are addressed by `(pk, sk)`; `put_item` is an upsert.
//! - Query results are ordered by `sk ASC` (by `pk, sk` for type scans).
//! - Stored `data` must parse as JSON; read paths reject anything else.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::ModelValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document store operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    NotFound { pk: String, sk: String },
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { pk, sk } => write!(f, "item not found: pk={pk} sk={sk}"),
            Self::InvalidData(message) => write!(f, "invalid stored item: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "item repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub pk: String,
    pub sk: String,
    /// Record discriminator (`Dashboard`, `Widget`, `Dataset`, `TopicArea`).
    pub item_type: String,
    pub data: Value,
}

/// Repository interface for the document table.
pub trait ItemRepository {
    fn put_item(&self, item: &Item) -> RepoResult<()>;
    fn get_item(&self, pk: &str, sk: &str) -> RepoResult<Option<Item>>;
    /// Lists items under one partition, optionally narrowed by sort-key prefix.
    fn query(&self, pk: &str, sk_prefix: Option<&str>) -> RepoResult<Vec<Item>>;
    fn list_by_type(&self, item_type: &str) -> RepoResult<Vec<Item>>;
    fn delete_item(&self, pk: &str, sk: &str) -> RepoResult<()>;
}

/// SQLite-backed document table.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn put_item(&self, item: &Item) -> RepoResult<()> {
        let data = serde_json::to_string(&item.data)
            .map_err(|err| RepoError::InvalidData(format!("cannot encode item data: {err}")))?;

        self.conn.execute(
            "INSERT INTO items (pk, sk, item_type, data)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (pk, sk) DO UPDATE SET
                item_type = excluded.item_type,
                data = excluded.data,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![item.pk, item.sk, item.item_type, data],
        )?;
        Ok(())
    }

    fn get_item(&self, pk: &str, sk: &str) -> RepoResult<Option<Item>> {
        let item = self
            .conn
            .query_row(
                "SELECT pk, sk, item_type, data FROM items WHERE pk = ?1 AND sk = ?2;",
                params![pk, sk],
                read_raw_item,
            )
            .optional()?;
        item.map(parse_item).transpose()
    }

    fn query(&self, pk: &str, sk_prefix: Option<&str>) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT pk, sk, item_type, data
             FROM items
             WHERE pk = ?1
               AND (?2 IS NULL OR substr(sk, 1, length(?2)) = ?2)
             ORDER BY sk ASC;",
        )?;
        let rows = stmt.query_map(params![pk, sk_prefix], read_raw_item)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(parse_item(row?)?);
        }
        Ok(items)
    }

    fn list_by_type(&self, item_type: &str) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT pk, sk, item_type, data
             FROM items
             WHERE item_type = ?1
             ORDER BY pk ASC, sk ASC;",
        )?;
        let rows = stmt.query_map([item_type], read_raw_item)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(parse_item(row?)?);
        }
        Ok(items)
    }

    fn delete_item(&self, pk: &str, sk: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE pk = ?1 AND sk = ?2;", params![pk, sk])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                pk: pk.to_string(),
                sk: sk.to_string(),
            });
        }
        Ok(())
    }
}

type RawItem = (String, String, String, String);

fn read_raw_item(row: &Row<'_>) -> rusqlite::Result<RawItem> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn parse_item((pk, sk, item_type, data): RawItem) -> RepoResult<Item> {
    let data = serde_json::from_str(&data).map_err(|err| {
        RepoError::InvalidData(format!("items.data for pk={pk} sk={sk} is not JSON: {err}"))
    })?;
    Ok(Item {
        pk,
        sk,
        item_type,
        data,
    })
}
