//! Activity payload validation.

use super::{
    deserialize_some, optional_choice, parse_choice, ValidationError, ValidationResult,
};
use crate::model::activity::{Activity, ActivityType};
use crate::model::contact::ContactId;
use crate::model::deal::DealId;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    /// Epoch milliseconds; the store substitutes "now" when absent.
    pub date: Option<i64>,
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub date: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub contact_id: Option<Option<ContactId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub deal_id: Option<Option<DealId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub kind: ActivityType,
    pub description: String,
    pub date: Option<i64>,
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityChanges {
    pub kind: Option<ActivityType>,
    pub description: Option<String>,
    pub date: Option<i64>,
    pub contact_id: Option<Option<ContactId>>,
    pub deal_id: Option<Option<DealId>>,
}

impl ActivityChanges {
    pub fn attached_contact(&self) -> Option<ContactId> {
        self.contact_id.flatten()
    }

    pub fn attached_deal(&self) -> Option<DealId> {
        self.deal_id.flatten()
    }

    pub fn apply_to(&self, activity: &mut Activity) {
        if let Some(kind) = self.kind {
            activity.kind = kind;
        }
        if let Some(description) = &self.description {
            activity.description = description.clone();
        }
        if let Some(date) = self.date {
            activity.date = date;
        }
        if let Some(contact_id) = self.contact_id {
            activity.contact_id = contact_id;
        }
        if let Some(deal_id) = self.deal_id {
            activity.deal_id = deal_id;
        }
    }
}

pub fn validate_new_activity(input: &NewActivity) -> ValidationResult<ActivityDraft> {
    let label = input
        .kind
        .as_deref()
        .ok_or(ValidationError::Required("type"))?;
    let kind = parse_choice("type", label, ActivityType::parse, ActivityType::expected)?;

    Ok(ActivityDraft {
        kind,
        description: input
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        date: input.date,
        contact_id: input.contact_id,
        deal_id: input.deal_id,
    })
}

pub fn validate_activity_patch(input: &ActivityPatch) -> ValidationResult<ActivityChanges> {
    let kind = optional_choice(
        "type",
        input.kind.as_deref(),
        ActivityType::parse,
        ActivityType::expected,
    )?;

    Ok(ActivityChanges {
        kind,
        description: input
            .description
            .as_deref()
            .map(|value| value.trim().to_string()),
        date: input.date,
        contact_id: input.contact_id,
        deal_id: input.deal_id,
    })
}

#[cfg(test)]
mod tests {
    use super::{validate_activity_patch, validate_new_activity, ActivityPatch, NewActivity};
    use crate::model::activity::ActivityType;
    use crate::validation::ValidationError;

    #[test]
    fn create_requires_known_type() {
        assert_eq!(
            validate_new_activity(&NewActivity::default()),
            Err(ValidationError::Required("type"))
        );

        let input = NewActivity {
            kind: Some("sms".to_string()),
            ..NewActivity::default()
        };
        assert!(matches!(
            validate_new_activity(&input),
            Err(ValidationError::InvalidChoice { field: "type", .. })
        ));
    }

    #[test]
    fn create_defaults_description_and_leaves_date_to_store() {
        let payload = serde_json::json!({ "type": "call" });
        let input: NewActivity = serde_json::from_value(payload).unwrap();
        let draft = validate_new_activity(&input).unwrap();
        assert_eq!(draft.kind, ActivityType::Call);
        assert_eq!(draft.description, "");
        assert_eq!(draft.date, None);
    }

    #[test]
    fn patch_type_is_optional() {
        let changes = validate_activity_patch(&ActivityPatch::default()).unwrap();
        assert_eq!(changes.kind, None);
    }
}
