//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `contacts` plus email lookup for uniqueness checks.
//! - Load the contact relations read model (deals, tasks, activities).
//!
//! # Invariants
//! - List order is `created_at DESC` (newest first, rowid tie-break).
//! - Unique-index violations on `email` surface as `RepoError::DuplicateEmail`.

use crate::model::activity::Activity;
use crate::model::contact::{Contact, ContactId, ContactStatus};
use crate::model::deal::{Deal, DealId};
use crate::model::task::Task;
use crate::model::EntityKind;
use crate::repo::activity_repo::{parse_activity_row, ACTIVITY_SELECT_SQL};
use crate::repo::deal_repo::{parse_deal_row, DEAL_SELECT_SQL};
use crate::repo::task_repo::{parse_task_row, TASK_SELECT_SQL};
use crate::repo::{
    check_persisted, delete_row, ensure_connection_ready, parse_label, parse_uuid, row_exists,
    ReferenceLookup, RepoError, RepoResult, NOW_MS_SQL,
};
use crate::validation::contact::ContactDraft;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    phone,
    company,
    position,
    status,
    created_at,
    updated_at
FROM contacts";

/// Contact together with every record that references it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRelations {
    #[serde(flatten)]
    pub contact: Contact,
    pub deals: Vec<Deal>,
    pub tasks: Vec<Task>,
    pub activities: Vec<Activity>,
}

/// Repository interface for contacts.
pub trait ContactRepository {
    fn create_contact(&self, draft: &ContactDraft) -> RepoResult<Contact>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    /// Full-row write of an existing contact; returns the stored row.
    fn update_contact(&self, contact: &Contact) -> RepoResult<Contact>;
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
    /// Finds a contact by exact email, optionally ignoring one id.
    fn find_by_email(
        &self,
        email: &str,
        excluding: Option<ContactId>,
    ) -> RepoResult<Option<Contact>>;
    fn load_relations(&self, id: ContactId) -> RepoResult<Option<ContactRelations>>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "contacts")?;
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, draft: &ContactDraft) -> RepoResult<Contact> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO contacts (
                    id,
                    name,
                    email,
                    phone,
                    company,
                    position,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    id.to_string(),
                    draft.name.as_str(),
                    draft.email.as_str(),
                    draft.phone.as_deref(),
                    draft.company.as_deref(),
                    draft.position.as_deref(),
                    draft.status.as_str(),
                ],
            )
            .map_err(map_write_error)?;

        load_required_contact(self.conn, id)
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        load_contact(self.conn, id)
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<Contact> {
        contact.validate()?;

        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE contacts
                     SET
                        name = ?1,
                        email = ?2,
                        phone = ?3,
                        company = ?4,
                        position = ?5,
                        status = ?6,
                        updated_at = {NOW_MS_SQL}
                     WHERE id = ?7;"
                ),
                params![
                    contact.name.as_str(),
                    contact.email.as_str(),
                    contact.phone.as_deref(),
                    contact.company.as_deref(),
                    contact.position.as_deref(),
                    contact.status.as_str(),
                    contact.id.to_string(),
                ],
            )
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Contact,
                id: contact.id,
            });
        }

        load_required_contact(self.conn, contact.id)
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Contact, id)
    }

    fn find_by_email(
        &self,
        email: &str,
        excluding: Option<ContactId>,
    ) -> RepoResult<Option<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             WHERE email = ?1
               AND (?2 IS NULL OR id <> ?2)
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![email, excluding.map(|id| id.to_string())])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn load_relations(&self, id: ContactId) -> RepoResult<Option<ContactRelations>> {
        let Some(contact) = load_contact(self.conn, id)? else {
            return Ok(None);
        };
        let contact_id = id.to_string();

        let mut stmt = self.conn.prepare(&format!(
            "{DEAL_SELECT_SQL} WHERE contact_id = ?1 ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([contact_id.as_str()])?;
        let mut deals = Vec::new();
        while let Some(row) = rows.next()? {
            deals.push(parse_deal_row(row)?);
        }

        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE contact_id = ?1 ORDER BY due_date ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([contact_id.as_str()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL} WHERE contact_id = ?1 ORDER BY date DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([contact_id.as_str()])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }

        Ok(Some(ContactRelations {
            contact,
            deals,
            tasks,
            activities,
        }))
    }
}

impl ReferenceLookup for SqliteContactRepository<'_> {
    fn contact_exists(&self, id: ContactId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Contact, id)
    }

    fn deal_exists(&self, id: DealId) -> RepoResult<bool> {
        row_exists(self.conn, EntityKind::Deal, id)
    }
}

fn load_contact(conn: &Connection, id: ContactId) -> RepoResult<Option<Contact>> {
    conn.query_row(
        &format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(parse_contact_row(row)),
    )
    .optional()?
    .transpose()
}

fn load_required_contact(conn: &Connection, id: ContactId) -> RepoResult<Contact> {
    load_contact(conn, id)?.ok_or(RepoError::NotFound {
        entity: EntityKind::Contact,
        id,
    })
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return RepoError::DuplicateEmail;
        }
    }
    err.into()
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id_text: String = row.get("id")?;
    let status_text: String = row.get("status")?;
    let contact = Contact {
        id: parse_uuid(&id_text, "contacts.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        company: row.get("company")?,
        position: row.get("position")?,
        status: parse_label(&status_text, "contacts.status", ContactStatus::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    check_persisted(contact.validate(), "contacts")?;
    Ok(contact)
}
