//! Task use-case service.
//!
//! # Invariants
//! - Status toggling cycles `TODO -> IN_PROGRESS -> DONE -> TODO`.
//! - Legacy label migration is idempotent; a second run migrates nothing.

use crate::model::task::{Task, TaskId};
use crate::model::EntityKind;
use crate::repo::task_repo::{LegacyMigrationReport, TaskRepository};
use crate::repo::ReferenceLookup;
use crate::service::{ensure_contact_exists, ServiceError, ServiceResult};
use crate::validation::task::{validate_new_task, validate_task_patch, NewTask, TaskPatch};

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository + ReferenceLookup> {
    repo: R,
}

impl<R: TaskRepository + ReferenceLookup> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists tasks by ascending due date.
    pub fn list(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.repo.list_tasks()?)
    }

    pub fn get(&self, id: TaskId) -> ServiceResult<Task> {
        self.repo
            .get_task(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Task, id))
    }

    pub fn add(&self, input: &NewTask) -> ServiceResult<Task> {
        let draft = validate_new_task(input)?;
        ensure_contact_exists(&self.repo, draft.contact_id)?;
        Ok(self.repo.create_task(&draft)?)
    }

    pub fn update(&self, id: TaskId, patch: &TaskPatch) -> ServiceResult<Task> {
        let changes = validate_task_patch(patch)?;
        let mut task = self.get(id)?;
        ensure_contact_exists(&self.repo, changes.attached_contact())?;

        changes.apply_to(&mut task);
        task.validate()?;
        Ok(self.repo.update_task(&task)?)
    }

    pub fn delete(&self, id: TaskId) -> ServiceResult<()> {
        Ok(self.repo.delete_task(id)?)
    }

    /// Advances the task to the next status in the toggle cycle.
    pub fn toggle_status(&self, id: TaskId) -> ServiceResult<Task> {
        let mut task = self.get(id)?;
        task.status = task.status.next();
        Ok(self.repo.update_task(&task)?)
    }

    /// Rewrites legacy status/priority labels to their canonical form.
    pub fn migrate_legacy(&self) -> ServiceResult<LegacyMigrationReport> {
        Ok(self.repo.migrate_legacy_tasks()?)
    }
}
