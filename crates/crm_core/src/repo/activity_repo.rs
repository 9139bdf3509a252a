//! Activity repository contract and SQLite implementation.
//!
//! # Invariants
//! - List order is `date DESC` (most recent first, rowid tie-break); the
//!   dashboard relies on this order for "recent activities".
//! - A missing `date` on create is filled by the store with the current time.

use crate::model::activity::{Activity, ActivityId, ActivityType};
use crate::model::contact::ContactId;
use crate::model::deal::DealId;
use crate::model::EntityKind;
use crate::repo::{
    check_persisted, delete_row, ensure_connection_ready, parse_label, parse_optional_uuid,
    parse_uuid, row_exists, ReferenceLookup, RepoError, RepoResult, NOW_MS_SQL,
};
use crate::validation::activity::ActivityDraft;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

pub(crate) const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    type,
    description,
    date,
    contact_id,
    deal_id,
    created_at,
    updated_at
FROM activities";

/// Repository interface for activities.
pub trait ActivityRepository {
    fn create_activity(&self, draft: &ActivityDraft) -> RepoResult<Activity>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    fn list_activities(&self) -> RepoResult<Vec<Activity>>;
    fn update_activity(&self, activity: &Activity) -> RepoResult<Activity>;
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
}

/// SQLite-backed activity repository.
pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "activities")?;
        Ok(Self { conn })
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn create_activity(&self, draft: &ActivityDraft) -> RepoResult<Activity> {
        let id = Uuid::new_v4();
        self.conn.execute(
            &format!(
                "INSERT INTO activities (
                    id,
                    type,
                    description,
                    date,
                    contact_id,
                    deal_id
                ) VALUES (?1, ?2, ?3, COALESCE(?4, {NOW_MS_SQL}), ?5, ?6);"
            ),
            params![
                id.to_string(),
                draft.kind.as_str(),
                draft.description.as_str(),
                draft.date,
                draft.contact_id.map(|id| id.to_string()),
                draft.deal_id.map(|id| id.to_string()),
            ],
        )?;

        load_required_activity(self.conn, id)
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        load_activity(self.conn, id)
    }

    fn list_activities(&self) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL} ORDER BY date DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn update_activity(&self, activity: &Activity) -> RepoResult<Activity> {
        activity.validate()?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE activities
                 SET
                    type = ?1,
                    description = ?2,
                    date = ?3,
                    contact_id = ?4,
                    deal_id = ?5,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?6;"
            ),
            params![
                activity.kind.as_str(),
                activity.description.as_str(),
                activity.date,
                activity.contact_id.map(|id| id.to_string()),
                activity.deal_id.map(|id| id.to_string()),
                activity.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(not_found(activity.id));
        }

        load_required_activity(self.conn, activity.id)
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Activity, id)
    }
}

impl ReferenceLookup for SqliteActivityRepository<'_> {
    fn contact_exists(&self, id: ContactId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Contact, id)
    }

    fn deal_exists(&self, id: DealId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Deal, id)
    }
}

fn not_found(id: ActivityId) -> RepoError {
    RepoError::NotFound {
        entity: EntityKind::Activity,
        id,
    }
}

fn load_activity(conn: &Connection, id: ActivityId) -> RepoResult<Option<Activity>> {
    conn.query_row(
        &format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(parse_activity_row(row)),
    )
    .optional()?
    .transpose()
}

fn load_required_activity(conn: &Connection, id: ActivityId) -> RepoResult<Activity> {
    load_activity(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let id_text: String = row.get("id")?;
    let type_text: String = row.get("type")?;
    let activity = Activity {
        id: parse_uuid(&id_text, "activities.id")?,
        kind: parse_label(&type_text, "activities.type", ActivityType::parse)?,
        description: row.get("description")?,
        date: row.get("date")?,
        contact_id: parse_optional_uuid(row.get("contact_id")?, "activities.contact_id")?,
        deal_id: parse_optional_uuid(row.get("deal_id")?, "activities.deal_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    check_persisted(activity.validate(), "activities")?;
    Ok(activity)
}
