//! Status workflow definitions
//!
//! Every moderated entity kind owns a `status` column drawn from a closed
//! domain. The domains live in one table, [`STATUS_DOMAINS`], and every
//! validation goes through [`validate_status`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Entity kinds that take part in the status workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Comment,
    Testimonial,
    Article,
    Video,
    Appointment,
}

impl EntityKind {
    /// All kinds, in table order
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Comment,
        EntityKind::Testimonial,
        EntityKind::Article,
        EntityKind::Video,
        EntityKind::Appointment,
    ];

    /// Name of the table holding rows of this kind
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Comment => "comments",
            EntityKind::Testimonial => "testimonials",
            EntityKind::Article => "articles",
            EntityKind::Video => "videos",
            EntityKind::Appointment => "appointments",
        }
    }

    /// Status domain for this kind
    pub fn domain(self) -> &'static StatusDomain {
        let table: &'static [StatusDomain; 5] = &STATUS_DOMAINS;
        let row = match self {
            EntityKind::Comment => 0,
            EntityKind::Testimonial => 1,
            EntityKind::Article => 2,
            EntityKind::Video => 3,
            EntityKind::Appointment => 4,
        };
        &table[row]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Comment => write!(f, "comment"),
            EntityKind::Testimonial => write!(f, "testimonial"),
            EntityKind::Article => write!(f, "article"),
            EntityKind::Video => write!(f, "video"),
            EntityKind::Appointment => write!(f, "appointment"),
        }
    }
}

/// The closed set of statuses a kind may hold, plus the one it starts in
#[derive(Debug)]
pub struct StatusDomain {
    pub kind: EntityKind,
    pub initial: &'static str,
    pub members: &'static [&'static str],
}

impl StatusDomain {
    pub fn contains(&self, status: &str) -> bool {
        self.members.contains(&status)
    }
}

const MODERATION: &[&str] = &["pending", "approved", "rejected"];
const PUBLICATION: &[&str] = &["pending approval", "approval", "rejected"];
const APPOINTMENT: &[&str] = &["pending", "confirmed", "cancelled"];

pub const STATUS_DOMAINS: [StatusDomain; 5] = [
    StatusDomain {
        kind: EntityKind::Comment,
        initial: "pending",
        members: MODERATION,
    },
    StatusDomain {
        kind: EntityKind::Testimonial,
        initial: "pending",
        members: MODERATION,
    },
    StatusDomain {
        kind: EntityKind::Article,
        initial: "pending approval",
        members: PUBLICATION,
    },
    StatusDomain {
        kind: EntityKind::Video,
        initial: "pending approval",
        members: PUBLICATION,
    },
    StatusDomain {
        kind: EntityKind::Appointment,
        initial: "pending",
        members: APPOINTMENT,
    },
];

/// Workflow failures
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid {kind} status: {status:?}")]
    InvalidStatus { kind: EntityKind, status: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Check a requested status against the kind's domain.
///
/// Matching is exact; `"Approved"` is not `"approved"`. Returns the canonical
/// static member on success.
pub fn validate_status(kind: EntityKind, requested: &str) -> Result<&'static str, WorkflowError> {
    kind.domain()
        .members
        .iter()
        .copied()
        .find(|member| *member == requested)
        .ok_or_else(|| WorkflowError::InvalidStatus {
            kind,
            status: requested.to_string(),
        })
}

/// Comment and testimonial status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid moderation status: {}", s)),
        }
    }
}

/// Article and video status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PublicationStatus {
    #[default]
    #[serde(rename = "pending approval")]
    PendingApproval,
    #[serde(rename = "approval")]
    Approval,
    #[serde(rename = "rejected")]
    Rejected,
}

impl PublicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PublicationStatus::PendingApproval => "pending approval",
            PublicationStatus::Approval => "approval",
            PublicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending approval" => Ok(PublicationStatus::PendingApproval),
            "approval" => Ok(PublicationStatus::Approval),
            "rejected" => Ok(PublicationStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid publication status: {}", s)),
        }
    }
}

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid appointment status: {}", s)),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn any_kind() -> impl Strategy<Value = EntityKind> {
        prop::sample::select(EntityKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn validation_agrees_with_membership(kind in any_kind(), requested in "[a-z ]{0,20}") {
            let accepted = validate_status(kind, &requested).is_ok();
            prop_assert_eq!(accepted, kind.domain().members.contains(&requested.as_str()));
        }

        #[test]
        fn every_member_validates_to_itself(kind in any_kind(), idx in 0usize..3) {
            let member = kind.domain().members[idx];
            prop_assert_eq!(validate_status(kind, member).unwrap(), member);
        }
    }
}
