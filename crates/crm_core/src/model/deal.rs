//! Deal domain model and pipeline stage labels.
//!
//! # Responsibility
//! - Define the sales-pipeline record and its stage classification.
//!
//! # Invariants
//! - `title` is non-blank.
//! - `value` is finite and non-negative.
//! - Stages form a free classification: any stage may move to any other.

use crate::model::contact::ContactId;
use crate::model::expected_labels;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a deal.
pub type DealId = Uuid;

/// Pipeline stage of a deal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    /// Initial stage; default for new deals.
    #[default]
    Lead,
    /// Offer sent.
    Proposal,
    /// Terms under discussion.
    Negotiation,
    /// Finished; excluded from the active deal count.
    Closed,
}

impl DealStage {
    /// Stages in board column order.
    pub const ALL: [DealStage; 4] = [
        Self::Lead,
        Self::Proposal,
        Self::Negotiation,
        Self::Closed,
    ];

    /// Stable wire/storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Closed => "closed",
        }
    }

    /// Board column heading.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Lead => "Leads",
            Self::Proposal => "Proposals",
            Self::Negotiation => "Negotiation",
            Self::Closed => "Closed Deals",
        }
    }

    /// Parses an exact label; no case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == value)
    }

    /// Whether a deal in this stage still counts toward the active pipeline.
    pub fn is_open(self) -> bool {
        self != Self::Closed
    }

    pub(crate) fn expected() -> String {
        expected_labels(Self::ALL.iter().map(|stage| stage.as_str()))
    }
}

impl Display for DealStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical deal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub value: f64,
    pub stage: DealStage,
    pub contact_id: Option<ContactId>,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Deal {
    /// Checks record invariants that do not need storage access.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::Blank("title"));
        }
        check_deal_value(self.value)
    }
}

pub(crate) fn check_deal_value(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite("value"));
    }
    if value < 0.0 {
        return Err(ValidationError::Negative("value"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_deal_value, DealStage};
    use crate::validation::ValidationError;

    #[test]
    fn stage_labels_round_trip_in_board_order() {
        let labels = DealStage::ALL.map(DealStage::as_str);
        assert_eq!(labels, ["lead", "proposal", "negotiation", "closed"]);
        for stage in DealStage::ALL {
            assert_eq!(DealStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(DealStage::parse("won"), None);
    }

    #[test]
    fn only_closed_is_not_open() {
        assert!(DealStage::Lead.is_open());
        assert!(DealStage::Negotiation.is_open());
        assert!(!DealStage::Closed.is_open());
        assert_eq!(DealStage::default(), DealStage::Lead);
    }

    #[test]
    fn value_must_be_finite_and_non_negative() {
        assert_eq!(check_deal_value(0.0), Ok(()));
        assert_eq!(
            check_deal_value(-1.0),
            Err(ValidationError::Negative("value"))
        );
        assert_eq!(
            check_deal_value(f64::NAN),
            Err(ValidationError::NonFinite("value"))
        );
    }
}
