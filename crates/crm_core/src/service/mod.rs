//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, reference checks and repository calls into
//!   single-record use cases.
//! - Map every failure onto the four-kind taxonomy callers respond with.
//!
//! # Invariants
//! - Validation and reference checks complete before any write; a rejected
//!   request leaves the store untouched.
//! - Partial updates read the current row, apply supplied fields, then write
//!   the full row back.

pub mod activity_service;
pub mod contact_service;
pub mod deal_service;
pub mod task_service;

use crate::model::contact::ContactId;
use crate::model::deal::DealId;
use crate::model::EntityKind;
use crate::repo::{ReferenceLookup, RepoError};
use crate::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error category a caller maps onto its own response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    ServerError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ServerError => "server_error",
        }
    }
}

/// Service error shared by every entity use case.
#[derive(Debug)]
pub enum ServiceError {
    /// Payload failed a validation rule.
    InvalidArgument(ValidationError),
    /// Target record or a referenced record does not exist.
    NotFound { entity: EntityKind, id: Uuid },
    /// Another contact already uses the email.
    DuplicateEmail,
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateEmail => ErrorKind::Conflict,
            Self::Repo(_) | Self::InconsistentState(_) => ErrorKind::ServerError,
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateEmail => write!(f, "a contact with this email already exists"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidArgument(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::DuplicateEmail => Self::DuplicateEmail,
            RepoError::Validation(err) => Self::InvalidArgument(err),
            other => Self::Repo(other),
        }
    }
}

/// Fails with `NotFound` when `contact_id` is set but unresolved.
pub(crate) fn ensure_contact_exists<L: ReferenceLookup>(
    lookup: &L,
    contact_id: Option<ContactId>,
) -> ServiceResult<()> {
    match contact_id {
        Some(id) if !lookup.contact_exists(id)? => {
            Err(ServiceError::not_found(EntityKind::Contact, id))
        }
        _ => Ok(()),
    }
}

/// Fails with `NotFound` when `deal_id` is set but unresolved.
pub(crate) fn ensure_deal_exists<L: ReferenceLookup>(
    lookup: &L,
    deal_id: Option<DealId>,
) -> ServiceResult<()> {
    match deal_id {
        Some(id) if !lookup.deal_exists(id)? => Err(ServiceError::not_found(EntityKind::Deal, id)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ServiceError};
    use crate::model::EntityKind;
    use crate::repo::RepoError;
    use crate::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn repo_errors_map_to_caller_kinds() {
        let id = Uuid::new_v4();
        let not_found = ServiceError::from(RepoError::NotFound {
            entity: EntityKind::Deal,
            id,
        });
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.to_string(), format!("Deal not found: {id}"));

        assert_eq!(
            ServiceError::from(RepoError::DuplicateEmail).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ServiceError::from(RepoError::Validation(ValidationError::Blank("title"))).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            ServiceError::from(RepoError::InvalidData("bad".to_string())).kind(),
            ErrorKind::ServerError
        );
    }
}
