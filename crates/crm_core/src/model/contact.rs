//! Contact domain model.
//!
//! # Responsibility
//! - Define the person/company record every other entity may reference.
//! - Own the contact status label set.
//!
//! # Invariants
//! - `name` and `email` are non-blank; `email` has a `local@domain` shape.
//! - `email` is unique among contacts (enforced by service and store index).
//! - Optional text fields are `None` rather than empty strings.

use crate::model::expected_labels;
use crate::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Stable identifier of a contact.
pub type ContactId = Uuid;

/// Relationship status of a contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    /// Currently engaged; default for new contacts.
    #[default]
    Active,
    /// No longer engaged.
    Inactive,
    /// Early interest, not yet qualified.
    Lead,
    /// Has bought at least once.
    Customer,
    /// Qualified, evaluating an offer.
    Prospect,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 5] = [
        Self::Active,
        Self::Inactive,
        Self::Lead,
        Self::Customer,
        Self::Prospect,
    ];

    /// Stable wire/storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Lead => "lead",
            Self::Customer => "customer",
            Self::Prospect => "prospect",
        }
    }

    /// Parses an exact label; no case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub(crate) fn expected() -> String {
        expected_labels(Self::ALL.iter().map(|status| status.as_str()))
    }
}

impl Display for ContactStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: ContactStatus,
    /// Epoch milliseconds, assigned by the store.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by the store on every write.
    pub updated_at: i64,
}

impl Contact {
    /// Checks record invariants that do not need storage access.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::Blank("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::Blank("email"));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Returns whether `value` looks like a deliverable address.
///
/// Only the shape is checked: one `@`, no whitespace, a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, ContactStatus};

    #[test]
    fn status_labels_round_trip() {
        for status in ContactStatus::ALL {
            assert_eq!(ContactStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ContactStatus::parse("Active"), None);
        assert_eq!(ContactStatus::parse("archived"), None);
        assert_eq!(ContactStatus::default(), ContactStatus::Active);
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("jane@designco.com"));
        assert!(!is_valid_email("jane@designco"));
        assert!(!is_valid_email("jane designco.com"));
        assert!(!is_valid_email("jane @designco.com"));
    }
}
