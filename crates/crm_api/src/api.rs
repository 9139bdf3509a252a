//! Use-case API consumed by the presentation layer.
//!
//! # Responsibility
//! - Expose list / create / update / delete per entity family, plus stage
//!   moves, task toggling, dashboard and pipeline views.
//! - Translate core errors into status-coded JSON envelopes.
//!
//! # Invariants
//! - Operations never panic; every failure becomes an `ApiResponse`.
//! - Failure bodies are `{"error": "<message>"}` with the core message
//!   passed through verbatim.
//! - Each call opens its own connection; nothing is cached between calls.

use crm_core::db::{open_db, DbError};
use crm_core::pipeline::activities_for_deal;
use crm_core::{
    core_version as core_version_inner, entity_counts, init_logging as init_logging_inner,
    ping as ping_inner, ActivityPatch, ActivityService, ContactPatch, ContactService, CrmSnapshot,
    DealPatch, DealService, EntityKind, ErrorKind, NewActivity, NewContact, NewDeal, NewTask,
    PipelineBoard, RepoError, ServiceError, SqliteActivityRepository, SqliteContactRepository,
    SqliteDealRepository, SqliteTaskRepository, TaskPatch, TaskService,
};
use log::{info, warn};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Environment variable naming the database file.
pub const DB_PATH_ENV: &str = "CRM_DB_PATH";
const DEFAULT_DB_FILE_NAME: &str = "crm.sqlite3";

/// Health-check passthrough.
pub fn ping() -> String {
    ping_inner().to_owned()
}

pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
pub fn init_logging(level: &str, log_dir: &str) -> String {
    match init_logging_inner(level, log_dir) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Status-coded JSON response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// HTTP-style status: 200, 400, 404, 409 or 500.
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Message of a failure body, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn failure(failure: &Failure) -> Self {
        Self {
            status: status_code(failure.kind),
            body: json!({ "error": failure.message }),
        }
    }
}

/// Maps an error kind to its response status.
pub fn status_code(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::InvalidArgument => 400,
        ErrorKind::NotFound => 404,
        ErrorKind::Conflict => 409,
        ErrorKind::ServerError => 500,
    }
}

#[derive(Debug)]
struct Failure {
    kind: ErrorKind,
    message: String,
}

impl Failure {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for Failure {
    fn from(value: ServiceError) -> Self {
        Self::new(value.kind(), value.to_string())
    }
}

impl From<RepoError> for Failure {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}

impl From<DbError> for Failure {
    fn from(value: DbError) -> Self {
        Self::new(ErrorKind::ServerError, value.to_string())
    }
}

type Outcome = Result<Value, Failure>;

/// Entry point bound to one database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmApi {
    db_path: PathBuf,
}

impl CrmApi {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Uses `CRM_DB_PATH`, or `<temp_dir>/crm.sqlite3` when unset or blank.
    pub fn from_env() -> Self {
        let configured = std::env::var(DB_PATH_ENV)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        match configured {
            Some(path) => Self::new(path),
            None => Self::new(std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Lists one entity family (`contacts`, `deals`, `tasks`, `activities`)
    /// in its store order.
    pub fn list(&self, entity: &str) -> ApiResponse {
        self.respond("list", || {
            let kind = parse_entity(entity)?;
            self.with_conn(|conn| match kind {
                EntityKind::Contact => to_json(contacts(conn)?.list()?),
                EntityKind::Deal => to_json(deals(conn)?.list()?),
                EntityKind::Task => to_json(tasks(conn)?.list()?),
                EntityKind::Activity => to_json(activities(conn)?.list()?),
            })
        })
    }

    /// Fetches one record by id.
    pub fn get(&self, entity: &str, id: &str) -> ApiResponse {
        self.respond("get", || {
            let kind = parse_entity(entity)?;
            let id = parse_id(id)?;
            self.with_conn(|conn| match kind {
                EntityKind::Contact => to_json(contacts(conn)?.get(id)?),
                EntityKind::Deal => to_json(deals(conn)?.get(id)?),
                EntityKind::Task => to_json(tasks(conn)?.get(id)?),
                EntityKind::Activity => to_json(activities(conn)?.get(id)?),
            })
        })
    }

    /// Creates a record from a JSON payload.
    pub fn create(&self, entity: &str, payload: &str) -> ApiResponse {
        self.respond("create", || {
            let kind = parse_entity(entity)?;
            self.with_conn(|conn| match kind {
                EntityKind::Contact => {
                    let input: NewContact = parse_payload(payload)?;
                    to_json(contacts(conn)?.add(&input)?)
                }
                EntityKind::Deal => {
                    let input: NewDeal = parse_payload(payload)?;
                    to_json(deals(conn)?.add(&input)?)
                }
                EntityKind::Task => {
                    let input: NewTask = parse_payload(payload)?;
                    to_json(tasks(conn)?.add(&input)?)
                }
                EntityKind::Activity => {
                    let input: NewActivity = parse_payload(payload)?;
                    to_json(activities(conn)?.add(&input)?)
                }
            })
        })
    }

    /// Applies a partial JSON payload; absent fields stay unchanged and
    /// explicit `null` clears a nullable field.
    pub fn update(&self, entity: &str, id: &str, payload: &str) -> ApiResponse {
        self.respond("update", || {
            let kind = parse_entity(entity)?;
            let id = parse_id(id)?;
            self.with_conn(|conn| match kind {
                EntityKind::Contact => {
                    let patch: ContactPatch = parse_payload(payload)?;
                    to_json(contacts(conn)?.update(id, &patch)?)
                }
                EntityKind::Deal => {
                    let patch: DealPatch = parse_payload(payload)?;
                    to_json(deals(conn)?.update(id, &patch)?)
                }
                EntityKind::Task => {
                    let patch: TaskPatch = parse_payload(payload)?;
                    to_json(tasks(conn)?.update(id, &patch)?)
                }
                EntityKind::Activity => {
                    let patch: ActivityPatch = parse_payload(payload)?;
                    to_json(activities(conn)?.update(id, &patch)?)
                }
            })
        })
    }

    pub fn delete(&self, entity: &str, id: &str) -> ApiResponse {
        self.respond("delete", || {
            let kind = parse_entity(entity)?;
            let id = parse_id(id)?;
            self.with_conn(|conn| {
                match kind {
                    EntityKind::Contact => contacts(conn)?.delete(id)?,
                    EntityKind::Deal => deals(conn)?.delete(id)?,
                    EntityKind::Task => tasks(conn)?.delete(id)?,
                    EntityKind::Activity => activities(conn)?.delete(id)?,
                }
                Ok(json!({ "success": true }))
            })
        })
    }

    /// Moves a deal to another pipeline stage.
    pub fn move_deal(&self, id: &str, stage: &str) -> ApiResponse {
        self.respond("move_deal", || {
            let id = parse_id(id)?;
            self.with_conn(|conn| to_json(deals(conn)?.move_deal(id, stage)?))
        })
    }

    /// Advances a task along `TODO -> IN_PROGRESS -> DONE -> TODO`.
    pub fn toggle_task_status(&self, id: &str) -> ApiResponse {
        self.respond("toggle_task_status", || {
            let id = parse_id(id)?;
            self.with_conn(|conn| to_json(tasks(conn)?.toggle_status(id)?))
        })
    }

    /// Contact with its deals, tasks and activities embedded.
    pub fn contact_detail(&self, id: &str) -> ApiResponse {
        self.respond("contact_detail", || {
            let id = parse_id(id)?;
            self.with_conn(|conn| to_json(contacts(conn)?.relations(id)?))
        })
    }

    /// Activities logged against one deal, most recent first.
    pub fn deal_activities(&self, id: &str) -> ApiResponse {
        self.respond("deal_activities", || {
            let id = parse_id(id)?;
            self.with_conn(|conn| {
                deals(conn)?.get(id)?;
                let logged = activities(conn)?.list()?;
                to_json(activities_for_deal(&logged, id))
            })
        })
    }

    /// Dashboard summary computed from a fresh snapshot.
    pub fn dashboard(&self) -> ApiResponse {
        self.respond("dashboard", || {
            self.with_conn(|conn| to_json(CrmSnapshot::load(conn)?.dashboard()))
        })
    }

    /// Row counts of all four entity families.
    pub fn dashboard_stats(&self) -> ApiResponse {
        self.respond("dashboard_stats", || {
            self.with_conn(|conn| to_json(entity_counts(conn)?))
        })
    }

    /// Pipeline board after a case-insensitive title filter.
    pub fn pipeline_board(&self, term: &str) -> ApiResponse {
        self.respond("pipeline_board", || {
            self.with_conn(|conn| {
                let listed = deals(conn)?.list()?;
                to_json(PipelineBoard::build(&listed, term))
            })
        })
    }

    /// Rewrites legacy task labels to their canonical form.
    pub fn migrate_tasks(&self) -> ApiResponse {
        self.respond("migrate_tasks", || {
            self.with_conn(|conn| {
                let report = tasks(conn)?.migrate_legacy()?;
                Ok(json!({
                    "success": true,
                    "message": format!("Successfully migrated {} tasks", report.migrated),
                    "report": report,
                }))
            })
        })
    }

    fn with_conn(&self, f: impl FnOnce(&Connection) -> Outcome) -> Outcome {
        let conn = open_db(&self.db_path)?;
        f(&conn)
    }

    fn respond(&self, op: &'static str, f: impl FnOnce() -> Outcome) -> ApiResponse {
        let started_at = Instant::now();
        match f() {
            Ok(body) => {
                info!(
                    "event=api_call module=api op={op} status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                ApiResponse::ok(body)
            }
            Err(failure) => {
                warn!(
                    "event=api_call module=api op={op} status=error error_code={} duration_ms={}",
                    failure.kind.as_str(),
                    started_at.elapsed().as_millis()
                );
                ApiResponse::failure(&failure)
            }
        }
    }
}

fn contacts(conn: &Connection) -> Result<ContactService<SqliteContactRepository<'_>>, Failure> {
    Ok(ContactService::new(SqliteContactRepository::try_new(conn)?))
}

fn deals(conn: &Connection) -> Result<DealService<SqliteDealRepository<'_>>, Failure> {
    Ok(DealService::new(SqliteDealRepository::try_new(conn)?))
}

fn tasks(conn: &Connection) -> Result<TaskService<SqliteTaskRepository<'_>>, Failure> {
    Ok(TaskService::new(SqliteTaskRepository::try_new(conn)?))
}

fn activities(conn: &Connection) -> Result<ActivityService<SqliteActivityRepository<'_>>, Failure> {
    Ok(ActivityService::new(SqliteActivityRepository::try_new(conn)?))
}

fn parse_entity(value: &str) -> Result<EntityKind, Failure> {
    EntityKind::ALL
        .into_iter()
        .find(|kind| kind.table() == value)
        .ok_or_else(|| Failure::new(ErrorKind::NotFound, format!("unknown entity `{value}`")))
}

fn parse_id(value: &str) -> Result<Uuid, Failure> {
    Uuid::parse_str(value.trim())
        .map_err(|_| Failure::new(ErrorKind::InvalidArgument, format!("invalid id `{value}`")))
}

fn parse_payload<T: DeserializeOwned>(payload: &str) -> Result<T, Failure> {
    serde_json::from_str(payload).map_err(|err| {
        Failure::new(
            ErrorKind::InvalidArgument,
            format!("invalid JSON payload: {err}"),
        )
    })
}

fn to_json(value: impl Serialize) -> Outcome {
    serde_json::to_value(value).map_err(|err| Failure::new(ErrorKind::ServerError, err.to_string()))
}
