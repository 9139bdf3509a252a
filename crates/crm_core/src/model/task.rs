//! Task domain model.
//!
//! # Responsibility
//! - Define follow-up work items with due date, status and priority.
//!
//! # Invariants
//! - `title` is non-blank.
//! - Status and priority labels are canonical uppercase; lowercase or
//!   legacy spellings are rejected on input and rewritten by
//!   `TaskRepository::migrate_legacy_tasks`.

use crate::model::contact::ContactId;
use crate::model::expected_labels;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a task.
pub type TaskId = Uuid;

/// Task progress state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started; counted as pending on the dashboard.
    #[default]
    Todo,
    /// Started.
    InProgress,
    /// Finished; excluded from upcoming tasks.
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    /// Next status in the toggle cycle `TODO -> IN_PROGRESS -> DONE -> TODO`.
    pub fn next(self) -> Self {
        match self {
            Self::Todo => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Todo,
        }
    }

    pub(crate) fn expected() -> String {
        expected_labels(Self::ALL.iter().map(|status| status.as_str()))
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    Low,
    /// Default for legacy rows without a priority.
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value)
    }

    pub(crate) fn expected() -> String {
        expected_labels(Self::ALL.iter().map(|priority| priority.as_str()))
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Epoch milliseconds.
    pub due_date: i64,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub contact_id: Option<ContactId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::Blank("title"));
        }
        Ok(())
    }

    /// Whether the task still needs attention.
    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskPriority, TaskStatus};

    #[test]
    fn toggle_cycles_through_all_statuses() {
        let mut status = TaskStatus::Todo;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(status);
            status = status.next();
        }
        assert_eq!(status, TaskStatus::Todo);
        assert_eq!(seen, TaskStatus::ALL.to_vec());
    }

    #[test]
    fn priority_parse_is_case_sensitive() {
        assert_eq!(TaskPriority::parse("MEDIUM"), Some(TaskPriority::Medium));
        assert_eq!(TaskPriority::parse("medium"), None);
        assert_eq!(TaskStatus::parse("CANCELLED"), None);
    }

    #[test]
    fn defaults_are_todo_and_medium() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }
}
