//! Payload validation for create and partial-update operations.
//!
//! # Responsibility
//! - Turn loosely-filled input structs into typed drafts/change sets.
//! - Reject malformed payloads before any storage access happens.
//!
//! # Invariants
//! - Exactly one reason is reported per rejection; the first violated rule wins.
//! - Create mode requires every mandatory field; patch mode only checks
//!   fields that were supplied.
//! - Enumerated labels are matched exactly against their closed set and are
//!   never coerced (no trimming, no case folding).

pub mod activity;
pub mod contact;
pub mod deal;
pub mod task;

use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Single descriptive rejection reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Record id is the nil UUID.
    NilId,
    /// Mandatory field missing from a create payload.
    Required(&'static str),
    /// Text field supplied but blank after trim.
    Blank(&'static str),
    /// Email does not have a `local@domain` shape.
    InvalidEmail,
    /// Enumerated field outside its closed set.
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: String,
    },
    /// Numeric field below zero.
    Negative(&'static str),
    /// Numeric field is NaN or infinite.
    NonFinite(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "id must not be nil"),
            Self::Required(field) => write!(f, "{field} is required"),
            Self::Blank(field) => write!(f, "{field} must not be blank"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::InvalidChoice {
                field,
                value,
                expected,
            } => write!(f, "{field} must be one of: {expected}; got `{value}`"),
            Self::Negative(field) => write!(f, "{field} must be a non-negative number"),
            Self::NonFinite(field) => write!(f, "{field} must be a finite number"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Keeps `null` distinguishable from an absent field in patch payloads.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>`: absent -> `None`, `null` -> `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn required_text(field: &'static str, value: Option<&str>) -> ValidationResult<String> {
    let value = value.ok_or(ValidationError::Required(field))?;
    non_blank(field, value)
}

fn non_blank(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_string())
}

/// Patch semantics for mandatory text: absent passes, supplied must be non-blank.
fn patch_text(field: &'static str, value: Option<&str>) -> ValidationResult<Option<String>> {
    value.map(|value| non_blank(field, value)).transpose()
}

/// Trims optional free text; empty collapses to `None`.
fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn nullable_patch_text(value: Option<&Option<String>>) -> Option<Option<String>> {
    value.map(|inner| optional_text(inner.as_deref()))
}

fn parse_choice<T>(
    field: &'static str,
    value: &str,
    parse: fn(&str) -> Option<T>,
    expected: fn() -> String,
) -> ValidationResult<T> {
    parse(value).ok_or_else(|| ValidationError::InvalidChoice {
        field,
        value: value.to_string(),
        expected: expected(),
    })
}

fn optional_choice<T>(
    field: &'static str,
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    expected: fn() -> String,
) -> ValidationResult<Option<T>> {
    value
        .map(|value| parse_choice(field, value, parse, expected))
        .transpose()
}
