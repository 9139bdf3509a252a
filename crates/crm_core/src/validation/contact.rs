//! Contact payload validation.

use super::{
    deserialize_some, nullable_patch_text, optional_choice, optional_text, patch_text,
    required_text, ValidationError, ValidationResult,
};
use crate::model::contact::{is_valid_email, Contact, ContactStatus};
use serde::Deserialize;

/// Create payload for a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
}

/// Partial-update payload for a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub position: Option<Option<String>>,
    pub status: Option<String>,
}

/// Validated contact ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: ContactStatus,
}

/// Validated contact change set; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub status: Option<ContactStatus>,
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies supplied fields onto `contact`, leaving the rest untouched.
    pub fn apply_to(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.name = name.clone();
        }
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            contact.phone = phone.clone();
        }
        if let Some(company) = &self.company {
            contact.company = company.clone();
        }
        if let Some(position) = &self.position {
            contact.position = position.clone();
        }
        if let Some(status) = self.status {
            contact.status = status;
        }
    }
}

/// Validates a create payload. Status defaults to `active`.
pub fn validate_new_contact(input: &NewContact) -> ValidationResult<ContactDraft> {
    let name = required_text("name", input.name.as_deref())?;
    let email = required_text("email", input.email.as_deref())?;
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    let status = optional_choice(
        "status",
        input.status.as_deref(),
        ContactStatus::parse,
        ContactStatus::expected,
    )?
    .unwrap_or_default();

    Ok(ContactDraft {
        name,
        email,
        phone: optional_text(input.phone.as_deref()),
        company: optional_text(input.company.as_deref()),
        position: optional_text(input.position.as_deref()),
        status,
    })
}

/// Validates a partial-update payload.
pub fn validate_contact_patch(input: &ContactPatch) -> ValidationResult<ContactChanges> {
    let name = patch_text("name", input.name.as_deref())?;
    let email = patch_text("email", input.email.as_deref())?;
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
    }
    let status = optional_choice(
        "status",
        input.status.as_deref(),
        ContactStatus::parse,
        ContactStatus::expected,
    )?;

    Ok(ContactChanges {
        name,
        email,
        phone: nullable_patch_text(input.phone.as_ref()),
        company: nullable_patch_text(input.company.as_ref()),
        position: nullable_patch_text(input.position.as_ref()),
        status,
    })
}
