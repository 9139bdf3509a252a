//! Task payload validation.

use super::{
    deserialize_some, nullable_patch_text, optional_choice, optional_text, parse_choice,
    patch_text, required_text, ValidationError, ValidationResult,
};
use crate::model::contact::ContactId;
use crate::model::task::{Task, TaskPriority, TaskStatus};
use serde::Deserialize;

/// Create payload for a task. Status and priority are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub contact_id: Option<ContactId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub due_date: Option<i64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub contact_id: Option<Option<ContactId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: i64,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub contact_id: Option<ContactId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub contact_id: Option<Option<ContactId>>,
}

impl TaskChanges {
    pub fn attached_contact(&self) -> Option<ContactId> {
        self.contact_id.flatten()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(contact_id) = self.contact_id {
            task.contact_id = contact_id;
        }
    }
}

pub fn validate_new_task(input: &NewTask) -> ValidationResult<TaskDraft> {
    let title = required_text("title", input.title.as_deref())?;
    let due_date = input.due_date.ok_or(ValidationError::Required("dueDate"))?;
    let status_label = input
        .status
        .as_deref()
        .ok_or(ValidationError::Required("status"))?;
    let status = parse_choice("status", status_label, TaskStatus::parse, TaskStatus::expected)?;
    let priority_label = input
        .priority
        .as_deref()
        .ok_or(ValidationError::Required("priority"))?;
    let priority = parse_choice(
        "priority",
        priority_label,
        TaskPriority::parse,
        TaskPriority::expected,
    )?;

    Ok(TaskDraft {
        title,
        description: optional_text(input.description.as_deref()),
        due_date,
        status,
        priority,
        contact_id: input.contact_id,
    })
}

pub fn validate_task_patch(input: &TaskPatch) -> ValidationResult<TaskChanges> {
    let title = patch_text("title", input.title.as_deref())?;
    let status = optional_choice(
        "status",
        input.status.as_deref(),
        TaskStatus::parse,
        TaskStatus::expected,
    )?;
    let priority = optional_choice(
        "priority",
        input.priority.as_deref(),
        TaskPriority::parse,
        TaskPriority::expected,
    )?;

    Ok(TaskChanges {
        title,
        description: nullable_patch_text(input.description.as_ref()),
        due_date: input.due_date,
        status,
        priority,
        contact_id: input.contact_id,
    })
}
