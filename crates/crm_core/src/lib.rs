//! Core domain logic for the pipeline CRM.
//! This crate is the single source of truth for business invariants.

pub mod dashboard;
pub mod db;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod repo;
pub mod service;
pub mod snapshot;
pub mod validation;

pub use dashboard::{DashboardSummary, DEFAULT_DASHBOARD_LIMIT};
pub use logging::{init_logging, init_logging_with, logging_status, LogLevel, LoggingConfig};
pub use model::activity::{Activity, ActivityId, ActivityType};
pub use model::contact::{Contact, ContactId, ContactStatus};
pub use model::deal::{Deal, DealId, DealStage};
pub use model::task::{Task, TaskId, TaskPriority, TaskStatus};
pub use model::EntityKind;
pub use pipeline::{DealsByStage, PipelineBoard, StageColumn};
pub use repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
pub use repo::contact_repo::{ContactRelations, ContactRepository, SqliteContactRepository};
pub use repo::deal_repo::{DealRepository, SqliteDealRepository};
pub use repo::task_repo::{LegacyMigrationReport, SqliteTaskRepository, TaskRepository};
pub use repo::{entity_counts, EntityCounts, ReferenceLookup, RepoError, RepoResult};
pub use service::activity_service::ActivityService;
pub use service::contact_service::ContactService;
pub use service::deal_service::DealService;
pub use service::task_service::TaskService;
pub use service::{ErrorKind, ServiceError, ServiceResult};
pub use snapshot::CrmSnapshot;
pub use validation::activity::{ActivityPatch, NewActivity};
pub use validation::contact::{ContactPatch, NewContact};
pub use validation::deal::{DealPatch, NewDeal};
pub use validation::task::{NewTask, TaskPatch};
pub use validation::ValidationError;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
