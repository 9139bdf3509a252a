//! Record store repositories over SQLite.
//!
//! # Responsibility
//! - Define per-entity persistence contracts used by services.
//! - Keep SQL details inside the store boundary.
//! - Expose the id-lookup capability services use to check references.
//!
//! # Invariants
//! - Write paths call the model `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state as `RepoError::InvalidData`
//!   instead of masking it.
//! - Missing rows on update/delete surface as `RepoError::NotFound`.

pub mod activity_repo;
pub mod contact_repo;
pub mod deal_repo;
pub mod task_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::contact::ContactId;
use crate::model::deal::DealId;
use crate::model::EntityKind;
use crate::validation::ValidationError;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// SQL expression for "now" in epoch milliseconds.
pub(crate) const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every entity store.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: EntityKind, id: Uuid },
    /// Store-level unique index on `contacts.email` rejected a write.
    DuplicateEmail,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateEmail => write!(f, "a contact with this email already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
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

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
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

/// Id-lookup capability used to check references before a write.
///
/// The check is a separate read; it is not transactional with the write
/// that follows.
pub trait ReferenceLookup {
    fn contact_exists(&self, id: ContactId) -> RepoResult<bool>;
    fn deal_exists(&self, id: DealId) -> RepoResult<bool>;
}

/// Row counts for every entity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub contacts: u64,
    pub deals: u64,
    pub tasks: u64,
    pub activities: u64,
}

/// Counts rows of all four entity tables.
pub fn entity_counts(conn: &Connection) -> RepoResult<EntityCounts> {
    Ok(EntityCounts {
        contacts: count_rows(conn, EntityKind::Contact)?,
        deals: count_rows(conn, EntityKind::Deal)?,
        tasks: count_rows(conn, EntityKind::Task)?,
        activities: count_rows(conn, EntityKind::Activity)?,
    })
}

fn count_rows(conn: &Connection, entity: EntityKind) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", entity.table()),
        [],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count in {}", entity.table())))
}

pub(crate) fn row_exists(conn: &Connection, entity: EntityKind, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
            entity.table()
        ),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Deletes one row by id; `NotFound` when nothing was removed.
pub(crate) fn delete_row(conn: &Connection, entity: EntityKind, id: Uuid) -> RepoResult<()> {
    let changed = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1;", entity.table()),
        [id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> RepoResult<Option<Uuid>> {
    value.map(|value| parse_uuid(&value, column)).transpose()
}

/// Maps a model invariant violation found on read to `InvalidData`.
///
/// Write paths keep `RepoError::Validation`; a stored row that fails
/// `validate()` is a store defect, not a caller error.
pub(crate) fn check_persisted(
    checked: Result<(), ValidationError>,
    table: &'static str,
) -> RepoResult<()> {
    checked.map_err(|err| RepoError::InvalidData(format!("{err} in {table}")))
}

pub(crate) fn parse_label<T>(
    value: &str,
    column: &'static str,
    parse: fn(&str) -> Option<T>,
) -> RepoResult<T> {
    parse(value).ok_or_else(|| RepoError::InvalidData(format!("invalid value `{value}` in {column}")))
}

/// Rejects connections that were not opened through `db::open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }
    Ok(())
}
