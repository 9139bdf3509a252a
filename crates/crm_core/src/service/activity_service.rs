//! Activity use-case service.

use crate::model::activity::{Activity, ActivityId};
use crate::model::EntityKind;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::ReferenceLookup;
use crate::service::{ensure_contact_exists, ensure_deal_exists, ServiceError, ServiceResult};
use crate::validation::activity::{
    validate_activity_patch, validate_new_activity, ActivityPatch, NewActivity,
};

/// Activity service facade over repository implementations.
pub struct ActivityService<R: ActivityRepository + ReferenceLookup> {
    repo: R,
}

impl<R: ActivityRepository + ReferenceLookup> ActivityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists activities most recent first.
    pub fn list(&self) -> ServiceResult<Vec<Activity>> {
        Ok(self.repo.list_activities()?)
    }

    pub fn get(&self, id: ActivityId) -> ServiceResult<Activity> {
        self.repo
            .get_activity(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Activity, id))
    }

    /// Logs an activity; a missing date means "now".
    pub fn add(&self, input: &NewActivity) -> ServiceResult<Activity> {
        let draft = validate_new_activity(input)?;
        ensure_contact_exists(&self.repo, draft.contact_id)?;
        ensure_deal_exists(&self.repo, draft.deal_id)?;
        Ok(self.repo.create_activity(&draft)?)
    }

    pub fn update(&self, id: ActivityId, patch: &ActivityPatch) -> ServiceResult<Activity> {
        let changes = validate_activity_patch(patch)?;
        let mut activity = self.get(id)?;
        ensure_contact_exists(&self.repo, changes.attached_contact())?;
        ensure_deal_exists(&self.repo, changes.attached_deal())?;

        changes.apply_to(&mut activity);
        activity.validate()?;
        Ok(self.repo.update_activity(&activity)?)
    }

    pub fn delete(&self, id: ActivityId) -> ServiceResult<()> {
        Ok(self.repo.delete_activity(id)?)
    }
}
