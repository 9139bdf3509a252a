//! Deal payload validation.

use super::{
    deserialize_some, nullable_patch_text, optional_choice, optional_text, patch_text,
    required_text, ValidationResult,
};
use crate::model::contact::ContactId;
use crate::model::deal::{check_deal_value, Deal, DealStage};
use serde::Deserialize;

/// Create payload for a deal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<String>,
    pub contact_id: Option<ContactId>,
    pub description: Option<String>,
}

/// Partial-update payload for a deal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealPatch {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub contact_id: Option<Option<ContactId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

/// Validated deal ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct DealDraft {
    pub title: String,
    pub value: f64,
    pub stage: DealStage,
    pub contact_id: Option<ContactId>,
    pub description: Option<String>,
}

/// Validated deal change set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealChanges {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<DealStage>,
    pub contact_id: Option<Option<ContactId>>,
    pub description: Option<Option<String>>,
}

impl DealChanges {
    /// Contact reference newly attached by this change set, if any.
    pub fn attached_contact(&self) -> Option<ContactId> {
        self.contact_id.flatten()
    }

    pub fn apply_to(&self, deal: &mut Deal) {
        if let Some(title) = &self.title {
            deal.title = title.clone();
        }
        if let Some(value) = self.value {
            deal.value = value;
        }
        if let Some(stage) = self.stage {
            deal.stage = stage;
        }
        if let Some(contact_id) = self.contact_id {
            deal.contact_id = contact_id;
        }
        if let Some(description) = &self.description {
            deal.description = description.clone();
        }
    }
}

/// Validates a create payload. Stage defaults to `lead`, value to zero.
pub fn validate_new_deal(input: &NewDeal) -> ValidationResult<DealDraft> {
    let title = required_text("title", input.title.as_deref())?;
    let value = input.value.unwrap_or(0.0);
    check_deal_value(value)?;
    let stage = optional_choice(
        "stage",
        input.stage.as_deref(),
        DealStage::parse,
        DealStage::expected,
    )?
    .unwrap_or_default();

    Ok(DealDraft {
        title,
        value,
        stage,
        contact_id: input.contact_id,
        description: optional_text(input.description.as_deref()),
    })
}

pub fn validate_deal_patch(input: &DealPatch) -> ValidationResult<DealChanges> {
    let title = patch_text("title", input.title.as_deref())?;
    if let Some(value) = input.value {
        check_deal_value(value)?;
    }
    let stage = optional_choice(
        "stage",
        input.stage.as_deref(),
        DealStage::parse,
        DealStage::expected,
    )?;

    Ok(DealChanges {
        title,
        value: input.value,
        stage,
        contact_id: input.contact_id,
        description: nullable_patch_text(input.description.as_ref()),
    })
}

/// Parses a stage label for a stage move.
pub fn validate_stage(label: &str) -> ValidationResult<DealStage> {
    super::parse_choice("stage", label, DealStage::parse, DealStage::expected)
}

#[cfg(test)]
mod tests {
    use super::{validate_deal_patch, validate_new_deal, validate_stage, DealPatch, NewDeal};
    use crate::model::deal::DealStage;
    use crate::validation::ValidationError;

    #[test]
    fn create_defaults_stage_and_value() {
        let input = NewDeal {
            title: Some("Website Redesign".to_string()),
            ..NewDeal::default()
        };
        let draft = validate_new_deal(&input).unwrap();
        assert_eq!(draft.stage, DealStage::Lead);
        assert_eq!(draft.value, 0.0);
        assert_eq!(draft.contact_id, None);
    }

    #[test]
    fn create_rejects_negative_value_before_stage() {
        let input = NewDeal {
            title: Some("Bad".to_string()),
            value: Some(-10.0),
            stage: Some("won".to_string()),
            ..NewDeal::default()
        };
        assert_eq!(
            validate_new_deal(&input),
            Err(ValidationError::Negative("value"))
        );
    }

    #[test]
    fn stage_labels_are_not_coerced() {
        assert_eq!(validate_stage("proposal"), Ok(DealStage::Proposal));
        assert!(matches!(
            validate_stage("Proposal"),
            Err(ValidationError::InvalidChoice { field: "stage", .. })
        ));
        assert!(validate_stage(" lead").is_err());
    }

    #[test]
    fn patch_can_detach_contact() {
        let patch: DealPatch =
            serde_json::from_value(serde_json::json!({ "contactId": null })).unwrap();
        let changes = validate_deal_patch(&patch).unwrap();
        assert_eq!(changes.contact_id, Some(None));
        assert_eq!(changes.attached_contact(), None);
    }
}
