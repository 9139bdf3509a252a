//! CRM domain model: contacts, deals, tasks and activities.
//!
//! # Responsibility
//! - Define the canonical records shared by store, services and API.
//! - Own the closed label sets of every enumerated field.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil UUID.
//! - References between records are optional ids, never embedded records.
//! - Enum fields only hold declared members; labels round-trip exactly.

pub mod activity;
pub mod contact;
pub mod deal;
pub mod task;

use std::fmt::{Display, Formatter};

/// One of the four persisted entity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Contact,
    Deal,
    Task,
    Activity,
}

impl EntityKind {
    /// All entity families in dashboard display order.
    pub const ALL: [EntityKind; 4] = [Self::Contact, Self::Deal, Self::Task, Self::Activity];

    /// Human-readable singular label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Contact => "Contact",
            Self::Deal => "Deal",
            Self::Task => "Task",
            Self::Activity => "Activity",
        }
    }

    /// Backing SQLite table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::Deal => "deals",
            Self::Task => "tasks",
            Self::Activity => "activities",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Joins enum labels for "must be one of" messages.
pub(crate) fn expected_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    labels.into_iter().collect::<Vec<_>>().join(", ")
}
