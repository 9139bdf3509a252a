//! Read-only snapshot of all four entity collections.
//!
//! The dashboard and pipeline engines take collections as arguments; this
//! type is how callers populate them from the store in one pass.

use crate::dashboard::DashboardSummary;
use crate::model::activity::Activity;
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::task::Task;
use crate::pipeline::PipelineBoard;
use crate::repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
use crate::repo::contact_repo::{ContactRepository, SqliteContactRepository};
use crate::repo::deal_repo::{DealRepository, SqliteDealRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::RepoResult;
use rusqlite::Connection;

/// Entity collections in their store list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrmSnapshot {
    pub contacts: Vec<Contact>,
    pub deals: Vec<Deal>,
    pub tasks: Vec<Task>,
    pub activities: Vec<Activity>,
}

impl CrmSnapshot {
    pub fn load(conn: &Connection) -> RepoResult<Self> {
        Ok(Self {
            contacts: SqliteContactRepository::try_new(conn)?.list_contacts()?,
            deals: SqliteDealRepository::try_new(conn)?.list_deals()?,
            tasks: SqliteTaskRepository::try_new(conn)?.list_tasks()?,
            activities: SqliteActivityRepository::try_new(conn)?.list_activities()?,
        })
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::compute(&self.contacts, &self.deals, &self.tasks, &self.activities)
    }

    pub fn board(&self, term: &str) -> PipelineBoard {
        PipelineBoard::build(&self.deals, term)
    }
}
