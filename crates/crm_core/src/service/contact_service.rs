//! Contact use-case service.
//!
//! # Invariants
//! - Email is unique across contacts; the check runs before the write and is
//!   backed by the store's unique index.
//! - Deleting a contact does not touch deals, tasks or activities that
//!   reference it.

use crate::model::contact::{Contact, ContactId};
use crate::model::EntityKind;
use crate::repo::contact_repo::{ContactRelations, ContactRepository};
use crate::service::{ServiceError, ServiceResult};
use crate::validation::contact::{
    validate_contact_patch, validate_new_contact, ContactPatch, NewContact,
};

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists contacts newest first.
    pub fn list(&self) -> ServiceResult<Vec<Contact>> {
        Ok(self.repo.list_contacts()?)
    }

    pub fn get(&self, id: ContactId) -> ServiceResult<Contact> {
        self.repo
            .get_contact(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Contact, id))
    }

    /// Loads a contact together with the deals, tasks and activities that
    /// reference it.
    pub fn relations(&self, id: ContactId) -> ServiceResult<ContactRelations> {
        self.repo
            .load_relations(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Contact, id))
    }

    pub fn add(&self, input: &NewContact) -> ServiceResult<Contact> {
        let draft = validate_new_contact(input)?;
        if self.repo.find_by_email(&draft.email, None)?.is_some() {
            return Err(ServiceError::DuplicateEmail);
        }
        Ok(self.repo.create_contact(&draft)?)
    }

    /// Applies a partial update; absent fields keep their stored value.
    pub fn update(&self, id: ContactId, patch: &ContactPatch) -> ServiceResult<Contact> {
        let changes = validate_contact_patch(patch)?;
        let mut contact = self.get(id)?;
        if let Some(email) = changes.email.as_deref() {
            if self.repo.find_by_email(email, Some(id))?.is_some() {
                return Err(ServiceError::DuplicateEmail);
            }
        }

        changes.apply_to(&mut contact);
        contact.validate()?;
        Ok(self.repo.update_contact(&contact)?)
    }

    pub fn delete(&self, id: ContactId) -> ServiceResult<()> {
        Ok(self.repo.delete_contact(id)?)
    }
}
