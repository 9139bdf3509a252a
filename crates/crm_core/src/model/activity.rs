//! Activity domain model.
//!
//! # Responsibility
//! - Define logged interactions (email, call, meeting) with a contact and/or deal.
//!
//! # Invariants
//! - `kind` is serialized as `type`.
//! - `description` is never null; absent input is stored as an empty string.

use crate::model::contact::ContactId;
use crate::model::deal::DealId;
use crate::model::expected_labels;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an activity.
pub type ActivityId = Uuid;

/// Interaction channel of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Email exchange.
    Email,
    /// Phone call.
    Call,
    /// In-person or video meeting.
    Meeting,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [Self::Email, Self::Call, Self::Meeting];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Call => "call",
            Self::Meeting => "meeting",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub(crate) fn expected() -> String {
        expected_labels(Self::ALL.iter().map(|kind| kind.as_str()))
    }
}

impl Display for ActivityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: String,
    /// Epoch milliseconds of the interaction.
    pub date: i64,
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Activity {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        Ok(())
    }
}
