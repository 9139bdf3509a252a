//! Deal repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `deals` and the single-column stage write used by
//!   pipeline moves.
//!
//! # Invariants
//! - List order is `created_at DESC` (newest first, rowid tie-break).
//! - `update_deal_stage` never touches any column other than `stage` and
//!   `updated_at`.

use crate::model::contact::ContactId;
use crate::model::deal::{Deal, DealId, DealStage};
use crate::model::EntityKind;
use crate::repo::{
    check_persisted, delete_row, ensure_connection_ready, parse_label, parse_optional_uuid,
    parse_uuid, row_exists, ReferenceLookup, RepoError, RepoResult, NOW_MS_SQL,
};
use crate::validation::deal::DealDraft;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

pub(crate) const DEAL_SELECT_SQL: &str = "SELECT
    id,
    title,
    value,
    stage,
    contact_id,
    description,
    created_at,
    updated_at
FROM deals";

/// Repository interface for deals.
pub trait DealRepository {
    fn create_deal(&self, draft: &DealDraft) -> RepoResult<Deal>;
    fn get_deal(&self, id: DealId) -> RepoResult<Option<Deal>>;
    fn list_deals(&self) -> RepoResult<Vec<Deal>>;
    fn update_deal(&self, deal: &Deal) -> RepoResult<Deal>;
    /// Persists a new stage only; returns the stored row.
    fn update_deal_stage(&self, id: DealId, stage: DealStage) -> RepoResult<Deal>;
    fn delete_deal(&self, id: DealId) -> RepoResult<()>;
}

/// SQLite-backed deal repository.
pub struct SqliteDealRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDealRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "deals")?;
        Ok(Self { conn })
    }
}

impl DealRepository for SqliteDealRepository<'_> {
    fn create_deal(&self, draft: &DealDraft) -> RepoResult<Deal> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO deals (
                id,
                title,
                value,
                stage,
                contact_id,
                description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                draft.title.as_str(),
                draft.value,
                draft.stage.as_str(),
                draft.contact_id.map(|id| id.to_string()),
                draft.description.as_deref(),
            ],
        )?;

        load_required_deal(self.conn, id)
    }

    fn get_deal(&self, id: DealId) -> RepoResult<Option<Deal>> {
        load_deal(self.conn, id)
    }

    fn list_deals(&self) -> RepoResult<Vec<Deal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEAL_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut deals = Vec::new();
        while let Some(row) = rows.next()? {
            deals.push(parse_deal_row(row)?);
        }
        Ok(deals)
    }

    fn update_deal(&self, deal: &Deal) -> RepoResult<Deal> {
        deal.validate()?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE deals
                 SET
                    title = ?1,
                    value = ?2,
                    stage = ?3,
                    contact_id = ?4,
                    description = ?5,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?6;"
            ),
            params![
                deal.title.as_str(),
                deal.value,
                deal.stage.as_str(),
                deal.contact_id.map(|id| id.to_string()),
                deal.description.as_deref(),
                deal.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(not_found(deal.id));
        }

        load_required_deal(self.conn, deal.id)
    }

    fn update_deal_stage(&self, id: DealId, stage: DealStage) -> RepoResult<Deal> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE deals
                 SET
                    stage = ?1,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?2;"
            ),
            params![stage.as_str(), id.to_string()],
        )?;

        if changed == 0 {
            return Err(not_found(id));
        }

        load_required_deal(self.conn, id)
    }

    fn delete_deal(&self, id: DealId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Deal, id)
    }
}

impl ReferenceLookup for SqliteDealRepository<'_> {
    fn contact_exists(&self, id: ContactId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Contact, id)
    }

    fn deal_exists(&self, id: DealId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Deal, id)
    }
}

fn not_found(id: DealId) -> RepoError {
    RepoError::NotFound {
        entity: EntityKind::Deal,
        id,
    }
}

fn load_deal(conn: &Connection, id: DealId) -> RepoResult<Option<Deal>> {
    conn.query_row(
        &format!("{DEAL_SELECT_SQL} WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(parse_deal_row(row)),
    )
    .optional()?
    .transpose()
}

fn load_required_deal(conn: &Connection, id: DealId) -> RepoResult<Deal> {
    load_deal(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn parse_deal_row(row: &Row<'_>) -> RepoResult<Deal> {
    let id_text: String = row.get("id")?;
    let stage_text: String = row.get("stage")?;
    let deal = Deal {
        id: parse_uuid(&id_text, "deals.id")?,
        title: row.get("title")?,
        value: row.get("value")?,
        stage: parse_label(&stage_text, "deals.stage", DealStage::parse)?,
        contact_id: parse_optional_uuid(row.get("contact_id")?, "deals.contact_id")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    check_persisted(deal.validate(), "deals")?;
    Ok(deal)
}
