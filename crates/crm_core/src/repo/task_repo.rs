//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `tasks`.
//! - Rewrite rows written with legacy status/priority labels.
//!
//! # Invariants
//! - List order is `due_date ASC` (earliest first, rowid tie-break).
//! - Rows holding non-canonical labels fail to load until migrated.
//! - After `migrate_legacy_tasks` every row loads: labels without a
//!   canonical mapping fall back to `TODO` / `MEDIUM`.

use crate::model::contact::ContactId;
use crate::model::deal::DealId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::EntityKind;
use crate::repo::{
    check_persisted, delete_row, ensure_connection_ready, parse_label, parse_optional_uuid,
    parse_uuid, row_exists, ReferenceLookup, RepoError, RepoResult, NOW_MS_SQL,
};
use crate::validation::task::TaskDraft;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

pub(crate) const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    due_date,
    status,
    priority,
    contact_id,
    created_at,
    updated_at
FROM tasks";

/// Outcome of a legacy task label rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMigrationReport {
    /// Rows inspected.
    pub scanned: u64,
    /// Rows rewritten to canonical labels.
    pub migrated: u64,
    /// Migrated rows where at least one label had no canonical mapping and
    /// was reset to its default (`TODO` / `MEDIUM`).
    pub defaulted: u64,
}

/// Repository interface for tasks.
pub trait TaskRepository {
    fn create_task(&self, draft: &TaskDraft) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn update_task(&self, task: &Task) -> RepoResult<Task>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Rewrites legacy status/priority labels in one transaction.
    fn migrate_legacy_tasks(&self) -> RepoResult<LegacyMigrationReport>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tasks")?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, draft: &TaskDraft) -> RepoResult<Task> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                due_date,
                status,
                priority,
                contact_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.due_date,
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.contact_id.map(|id| id.to_string()),
            ],
        )?;

        load_required_task(self.conn, id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        load_task(self.conn, id)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} ORDER BY due_date ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<Task> {
        task.validate()?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE tasks
                 SET
                    title = ?1,
                    description = ?2,
                    due_date = ?3,
                    status = ?4,
                    priority = ?5,
                    contact_id = ?6,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?7;"
            ),
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.due_date,
                task.status.as_str(),
                task.priority.as_str(),
                task.contact_id.map(|id| id.to_string()),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(not_found(task.id));
        }

        load_required_task(self.conn, task.id)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Task, id)
    }

    fn migrate_legacy_tasks(&self) -> RepoResult<LegacyMigrationReport> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut report = LegacyMigrationReport::default();

        let rows = {
            let mut stmt = tx.prepare("SELECT id, status, priority FROM tasks;")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        for (id, status, priority) in rows {
            report.scanned += 1;
            let mapped_status = canonical_status(status.as_deref());
            let mapped_priority = canonical_priority(priority.as_deref());
            let defaulted = mapped_status.is_none() || mapped_priority.is_none();
            let new_status = mapped_status.unwrap_or_default();
            let new_priority = mapped_priority.unwrap_or_default();

            let unchanged = status.as_deref() == Some(new_status.as_str())
                && priority.as_deref() == Some(new_priority.as_str());
            if unchanged {
                continue;
            }

            tx.execute(
                &format!(
                    "UPDATE tasks
                     SET
                        status = ?1,
                        priority = ?2,
                        updated_at = {NOW_MS_SQL}
                     WHERE id = ?3;"
                ),
                params![new_status.as_str(), new_priority.as_str(), id],
            )?;
            report.migrated += 1;
            if defaulted {
                report.defaulted += 1;
            }
        }
        tx.commit()?;

        if report.defaulted > 0 {
            warn!(
                "event=task_migrate module=repo status=defaulted scanned={} migrated={} defaulted={}",
                report.scanned, report.migrated, report.defaulted
            );
        } else {
            info!(
                "event=task_migrate module=repo status=ok scanned={} migrated={}",
                report.scanned, report.migrated
            );
        }
        Ok(report)
    }
}

impl ReferenceLookup for SqliteTaskRepository<'_> {
    fn contact_exists(&self, id: ContactId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Contact, id)
    }

    fn deal_exists(&self, id: DealId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Deal, id)
    }
}

/// Maps a stored status label (possibly legacy) to its canonical value.
///
/// `completed -> DONE`, `pending -> TODO`, missing/blank -> `TODO`, and
/// lowercase spellings of canonical labels are upper-cased.
fn canonical_status(value: Option<&str>) -> Option<TaskStatus> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Some(TaskStatus::Todo);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "completed" => Some(TaskStatus::Done),
        "pending" => Some(TaskStatus::Todo),
        other => TaskStatus::parse(&other.to_ascii_uppercase()),
    }
}

/// Missing/blank -> `MEDIUM`; other spellings are upper-cased.
fn canonical_priority(value: Option<&str>) -> Option<TaskPriority> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Some(TaskPriority::Medium);
    }
    TaskPriority::parse(&trimmed.to_ascii_uppercase())
}

fn not_found(id: TaskId) -> RepoError {
    RepoError::NotFound {
        entity: EntityKind::Task,
        id,
    }
}

fn load_task(conn: &Connection, id: TaskId) -> RepoResult<Option<Task>> {
    conn.query_row(
        &format!("{TASK_SELECT_SQL} WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(parse_task_row(row)),
    )
    .optional()?
    .transpose()
}

fn load_required_task(conn: &Connection, id: TaskId) -> RepoResult<Task> {
    load_task(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let status_text: Option<String> = row.get("status")?;
    let priority_text: Option<String> = row.get("priority")?;
    let task = Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        status: parse_label(
            status_text.as_deref().unwrap_or_default(),
            "tasks.status",
            TaskStatus::parse,
        )?,
        priority: parse_label(
            priority_text.as_deref().unwrap_or_default(),
            "tasks.priority",
            TaskPriority::parse,
        )?,
        contact_id: parse_optional_uuid(row.get("contact_id")?, "tasks.contact_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    check_persisted(task.validate(), "tasks")?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::{canonical_priority, canonical_status};
    use crate::model::task::{TaskPriority, TaskStatus};

    #[test]
    fn legacy_statuses_map_to_canonical_labels() {
        assert_eq!(canonical_status(Some("completed")), Some(TaskStatus::Done));
        assert_eq!(canonical_status(Some("pending")), Some(TaskStatus::Todo));
        assert_eq!(canonical_status(None), Some(TaskStatus::Todo));
        assert_eq!(canonical_status(Some("")), Some(TaskStatus::Todo));
        assert_eq!(
            canonical_status(Some("in_progress")),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(canonical_status(Some("DONE")), Some(TaskStatus::Done));
        assert_eq!(canonical_status(Some("cancelled")), None);
    }

    #[test]
    fn legacy_priorities_default_to_medium_and_upcase() {
        assert_eq!(canonical_priority(None), Some(TaskPriority::Medium));
        assert_eq!(canonical_priority(Some("medium")), Some(TaskPriority::Medium));
        assert_eq!(canonical_priority(Some("High")), Some(TaskPriority::High));
        assert_eq!(canonical_priority(Some("urgent")), None);
    }
}
