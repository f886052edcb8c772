//! Asset model: standards, authority-controlled status, and registry metadata.
//!
//! ## Status machine
//!
//! ```text
//!   ┌─────┐ approve ┌────────┐ freeze   ┌──────────┐
//!   │ NEW ├────────▶│ ACTIVE │─────────▶│ INACTIVE │
//!   └─────┘         └────────┘◀─────────┴──────────┘
//!                              unfreeze
//! ```
//!
//! NEW → ACTIVE happens once. ACTIVE ⇄ INACTIVE is reversible, and only the
//! registry authority may drive any of these transitions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChainId, ContractAddress, ResourceId};

/// The token standards an asset handle can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStandard {
    /// Plain fungible balances.
    PlainFungible,
    /// Plain non-fungible tokens, one owner per token id.
    PlainNonFungible,
    /// Plain multi-token balances, a fungible amount per token id.
    PlainMulti,
    /// Commitment-backed confidential balances.
    Confidential,
}

impl AssetStandard {
    #[must_use]
    pub fn is_confidential(self) -> bool {
        matches!(self, Self::Confidential)
    }
}

impl fmt::Display for AssetStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainFungible => write!(f, "PLAIN_FUNGIBLE"),
            Self::PlainNonFungible => write!(f, "PLAIN_NON_FUNGIBLE"),
            Self::PlainMulti => write!(f, "PLAIN_MULTI"),
            Self::Confidential => write!(f, "CONFIDENTIAL"),
        }
    }
}

/// Authority-controlled lifecycle status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    /// Registered as a candidate, not yet approved.
    New,
    /// Approved; transfers and inbound credits are allowed.
    Active,
    /// Frozen; inbound credit is rejected.
    Inactive,
}

impl AssetStatus {
    /// Can the authority move the asset from `self` to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::New | Self::Inactive, Self::Active) | (Self::Active, Self::Inactive)
        )
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Metadata an issuer submits when registering a candidate asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    /// The chain the asset was first issued on.
    pub issuer_chain: ChainId,
    /// The issuer's implementation address on that chain.
    pub issuer_address: ContractAddress,
    pub standard: AssetStandard,
}

/// What `resolve(resource_id)` hands to a chain that has never seen the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedResource {
    pub resource_id: ResourceId,
    pub issuer_chain: ChainId,
    pub issuer_address: ContractAddress,
    pub standard: AssetStandard,
    pub name: String,
    pub symbol: String,
}

/// A registry entry: metadata plus the authority-controlled status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub resource_id: ResourceId,
    pub metadata: AssetMetadata,
    pub status: AssetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetRecord {
    #[must_use]
    pub fn resolved(&self) -> ResolvedResource {
        ResolvedResource {
            resource_id: self.resource_id,
            issuer_chain: self.metadata.issuer_chain,
            issuer_address: self.metadata.issuer_address,
            standard: self.metadata.standard,
            name: self.metadata.name.clone(),
            symbol: self.metadata.symbol.clone(),
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl AssetMetadata {
    /// Metadata for a test asset issued on `issuer_chain`.
    pub fn dummy(symbol: &str, issuer_chain: ChainId, standard: AssetStandard) -> Self {
        Self {
            name: format!("{symbol} token"),
            symbol: symbol.to_string(),
            issuer_chain,
            issuer_address: ContractAddress([0x11; 20]),
            standard,
        }
    }
}
