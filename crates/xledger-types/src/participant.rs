//! Participant model: the ledger chains registered on the coordination chain.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ChainId;

/// Lifecycle status of a participant chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantStatus {
    New,
    Active,
    Inactive,
    Frozen,
}

impl ParticipantStatus {
    /// Can the authority move the participant from `self` to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::New | Self::Inactive | Self::Frozen, Self::Active)
                | (Self::Active, Self::Inactive | Self::Frozen)
        )
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
            Self::Frozen => write!(f, "FROZEN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantRole {
    Participant,
    Issuer,
    Auditor,
}

/// A participant chain as recorded by the coordination chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub chain_id: ChainId,
    pub name: String,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }
}
