//! Identifiers used throughout xledger.
//!
//! Resource ids use UUIDv7 so registry listings sort by registration time.
//! Reference ids are derived deterministically from the origin call, so the
//! origin chain and every destination agree on the same 32 bytes without
//! any further coordination.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants;

// ---------------------------------------------------------------------------
// ChainId
// ---------------------------------------------------------------------------

/// Identifier of a ledger chain or of the coordination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// HolderId
// ---------------------------------------------------------------------------

/// Account address of a balance holder on a ledger chain (20 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HolderId(pub [u8; 20]);

impl HolderId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// ContractAddress
// ---------------------------------------------------------------------------

/// Address of a destination-side program a callable may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ContractAddress(pub [u8; 20]);

impl ContractAddress {
    /// The all-zero address, used by single-leg callers to mean "no target".
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// ResourceId
// ---------------------------------------------------------------------------

/// Globally unique id the Resource Registry assigns to an asset.
/// Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ResourceId(pub Uuid);

impl ResourceId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// The nil id. Single-leg callers pass it to mean "no resource target".
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ReferenceId
// ---------------------------------------------------------------------------

/// Correlation id minted once per transfer call and carried by every leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReferenceId(pub [u8; 32]);

impl ReferenceId {
    /// Derive the reference id for one origin call.
    ///
    /// `nonce` is the origin chain's monotonically increasing call counter,
    /// so two calls from the same sender never collide.
    #[must_use]
    pub fn derive(origin: ChainId, resource: ResourceId, sender: HolderId, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::REFERENCE_ID_DOMAIN);
        hasher.update(origin.0.to_le_bytes());
        hasher.update(resource.0.as_bytes());
        hasher.update(sender.0);
        hasher.update(nonce.to_le_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Token id within a non-fungible or multi-token asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WindowId
// ---------------------------------------------------------------------------

/// A settlement window: one coordination-chain block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl WindowId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window:{}", self.0)
    }
}
