//! Deal use-case service and pipeline stage moves.
//!
//! # Responsibility
//! - Create, update and delete deals with contact reference checks.
//! - Drive the four-state stage machine (`lead`, `proposal`,
//!   `negotiation`, `closed`); every transition is allowed.
//!
//! # Invariants
//! - A stage move writes `stage` only; title, value and references stay
//!   untouched.
//! - Moving a deal to its current stage succeeds and changes nothing but
//!   `updated_at`.

use crate::model::deal::{Deal, DealId, DealStage};
use crate::model::EntityKind;
use crate::repo::deal_repo::DealRepository;
use crate::repo::ReferenceLookup;
use crate::service::{ensure_contact_exists, ServiceError, ServiceResult};
use crate::validation::deal::{
    validate_deal_patch, validate_new_deal, validate_stage, DealPatch, NewDeal,
};
use log::{info, warn};
use std::time::Instant;

/// Deal service facade over repository implementations.
pub struct DealService<R: DealRepository + ReferenceLookup> {
    repo: R,
}

impl<R: DealRepository + ReferenceLookup> DealService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists deals newest first.
    pub fn list(&self) -> ServiceResult<Vec<Deal>> {
        Ok(self.repo.list_deals()?)
    }

    pub fn get(&self, id: DealId) -> ServiceResult<Deal> {
        self.repo
            .get_deal(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Deal, id))
    }

    /// Creates a deal; stage defaults to `lead` and value to zero.
    pub fn add(&self, input: &NewDeal) -> ServiceResult<Deal> {
        let draft = validate_new_deal(input)?;
        ensure_contact_exists(&self.repo, draft.contact_id)?;
        Ok(self.repo.create_deal(&draft)?)
    }

    pub fn update(&self, id: DealId, patch: &DealPatch) -> ServiceResult<Deal> {
        let changes = validate_deal_patch(patch)?;
        let mut deal = self.get(id)?;
        ensure_contact_exists(&self.repo, changes.attached_contact())?;

        changes.apply_to(&mut deal);
        deal.validate()?;
        Ok(self.repo.update_deal(&deal)?)
    }

    pub fn delete(&self, id: DealId) -> ServiceResult<()> {
        Ok(self.repo.delete_deal(id)?)
    }

    /// Moves a deal to the stage named by `stage_label`.
    ///
    /// # Errors
    /// - `NotFound` when the deal does not exist.
    /// - `InvalidArgument` when the label is not one of the four stages.
    pub fn move_deal(&self, id: DealId, stage_label: &str) -> ServiceResult<Deal> {
        let current = self.get(id)?;
        let stage = validate_stage(stage_label).map_err(|err| {
            warn!(
                "event=deal_move module=pipeline status=rejected deal_id={id} error_code=invalid_stage"
            );
            err
        })?;
        self.transition(current, stage)
    }

    /// Moves a deal to an already-parsed stage.
    pub fn move_deal_to(&self, id: DealId, stage: DealStage) -> ServiceResult<Deal> {
        let current = self.get(id)?;
        self.transition(current, stage)
    }

    fn transition(&self, current: Deal, stage: DealStage) -> ServiceResult<Deal> {
        let started_at = Instant::now();
        let moved = self.repo.update_deal_stage(current.id, stage)?;
        if moved.stage != stage {
            return Err(ServiceError::InconsistentState(
                "deal stage differs from requested stage after move",
            ));
        }
        info!(
            "event=deal_move module=pipeline status=ok deal_id={} from_stage={} to_stage={} duration_ms={}",
            moved.id,
            current.stage,
            moved.stage,
            started_at.elapsed().as_millis()
        );
        Ok(moved)
    }
}
