//! Dashboard aggregation over in-memory entity collections.
//!
//! # Responsibility
//! - Derive counts, totals and short widget lists from the four entity
//!   collections handed in by the caller.
//!
//! # Invariants
//! - Every function is pure: same input, same output, no errors.
//! - Empty input yields zero or empty results.
//! - `recent_activities` trusts the store's `date DESC` order and does not
//!   re-sort.

use crate::model::activity::{Activity, ActivityType};
use crate::model::contact::Contact;
use crate::model::deal::{Deal, DealStage};
use crate::model::task::{Task, TaskStatus};
use serde::Serialize;

/// Widget list length used when the caller does not pick one.
pub const DEFAULT_DASHBOARD_LIMIT: usize = 5;

/// Deals not yet closed.
pub fn active_deals_count(deals: &[Deal]) -> usize {
    deals
        .iter()
        .filter(|deal| deal.stage != DealStage::Closed)
        .count()
}

/// Sum of `value` over every deal, closed ones included.
pub fn total_pipeline_value(deals: &[Deal]) -> f64 {
    deals.iter().map(|deal| deal.value).sum()
}

/// Tasks still in `TODO`.
pub fn pending_tasks_count(tasks: &[Task]) -> usize {
    tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Todo)
        .count()
}

/// First `limit` open tasks by ascending due date.
///
/// The sort is stable, so tasks sharing a due date keep their input order.
pub fn upcoming_tasks(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut open: Vec<Task> = tasks.iter().filter(|task| task.is_open()).cloned().collect();
    open.sort_by_key(|task| task.due_date);
    open.truncate(limit);
    open
}

/// First `limit` activities in the order given.
pub fn recent_activities(activities: &[Activity], limit: usize) -> Vec<Activity> {
    activities.iter().take(limit).cloned().collect()
}

pub fn filter_tasks_by_status(tasks: &[Task], status: TaskStatus) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.status == status)
        .cloned()
        .collect()
}

pub fn filter_activities_by_type(activities: &[Activity], kind: ActivityType) -> Vec<Activity> {
    activities
        .iter()
        .filter(|activity| activity.kind == kind)
        .cloned()
        .collect()
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_contacts: usize,
    pub active_deals: usize,
    pub total_pipeline_value: f64,
    pub pending_tasks: usize,
    pub total_activities: usize,
    pub upcoming_tasks: Vec<Task>,
    pub recent_activities: Vec<Activity>,
}

impl DashboardSummary {
    /// Computes the summary with widget lists of `DEFAULT_DASHBOARD_LIMIT`.
    pub fn compute(
        contacts: &[Contact],
        deals: &[Deal],
        tasks: &[Task],
        activities: &[Activity],
    ) -> Self {
        Self::compute_with_limit(contacts, deals, tasks, activities, DEFAULT_DASHBOARD_LIMIT)
    }

    pub fn compute_with_limit(
        contacts: &[Contact],
        deals: &[Deal],
        tasks: &[Task],
        activities: &[Activity],
        limit: usize,
    ) -> Self {
        Self {
            total_contacts: contacts.len(),
            active_deals: active_deals_count(deals),
            total_pipeline_value: total_pipeline_value(deals),
            pending_tasks: pending_tasks_count(tasks),
            total_activities: activities.len(),
            upcoming_tasks: upcoming_tasks(tasks, limit),
            recent_activities: recent_activities(activities, limit),
        }
    }
}
