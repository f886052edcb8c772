//! Transfer request model: legs, values, callables, and reference status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Blinding, ChainId, ContractAddress, HolderId, ResourceId, TokenId};

// ---------------------------------------------------------------------------
// Callables
// ---------------------------------------------------------------------------

/// Where a callable is executed on the destination chain.
///
/// A callable names a resource **or** a contract, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallTarget {
    Resource(ResourceId),
    Contract(ContractAddress),
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(id) => write!(f, "{id}"),
            Self::Contract(addr) => write!(f, "{addr}"),
        }
    }
}

/// A side-effecting instruction executed at the destination after credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callable {
    pub target: CallTarget,
    pub payload: Vec<u8>,
}

impl Callable {
    #[must_use]
    pub fn new(target: CallTarget, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            target,
            payload: payload.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Leg requests
// ---------------------------------------------------------------------------

/// The amount a caller asks to move on one leg.
///
/// The dispatcher checks it against the asset's standard: fungible and
/// confidential assets take `Amount`, non-fungible assets take `Tokens`,
/// multi-token assets take `Multi`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegAmount {
    Amount(u128),
    Tokens(Vec<TokenId>),
    Multi { token_id: TokenId, amount: u128 },
}

/// One destination leg of a transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLeg {
    pub holder: HolderId,
    pub amount: LegAmount,
    pub dest_chain: ChainId,
    pub callables: Vec<Callable>,
}

impl TransferLeg {
    #[must_use]
    pub fn new(holder: HolderId, amount: LegAmount, dest_chain: ChainId) -> Self {
        Self {
            holder,
            amount,
            dest_chain,
            callables: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_callables(mut self, callables: Vec<Callable>) -> Self {
        self.callables = callables;
        self
    }
}

/// Whether delivery failure is compensated at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferMode {
    /// Fire-and-forget: a rejected leg is logged at the destination.
    Standard,
    /// Single-leg teleport: a rejected leg is reported back and re-credited
    /// at the origin.
    Atomic,
}

// ---------------------------------------------------------------------------
// Wire values
// ---------------------------------------------------------------------------

/// The value a transfer message carries to its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferValue {
    Fungible { amount: u128 },
    NonFungible { token_ids: Vec<TokenId> },
    Multi { token_id: TokenId, amount: u128 },
    /// The destination learns the amount and blinding of its own leg so it
    /// can keep the opening of its commitment; the coordination chain only
    /// ever sees `Commit(amount, blinding)`.
    Confidential { amount: u128, blinding: Blinding },
}

impl TransferValue {
    /// Fungible quantity moved, or the number of tokens for non-fungibles.
    #[must_use]
    pub fn quantity(&self) -> u128 {
        match self {
            Self::Fungible { amount }
            | Self::Multi { amount, .. }
            | Self::Confidential { amount, .. } => *amount,
            Self::NonFungible { token_ids } => token_ids.len() as u128,
        }
    }
}

// ---------------------------------------------------------------------------
// ReferenceStatus
// ---------------------------------------------------------------------------

/// Per-chain delivery status of a reference id.
///
/// Transitions are monotonic: `UNSET → SENT` on the origin, and
/// `UNSET → RECEIVED` on each destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceStatus {
    Unset,
    Sent,
    Received,
}

impl ReferenceStatus {
    /// Numeric code exposed by `referenceIdStatus`: 0, 1, 2.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::Sent => 1,
            Self::Received => 2,
        }
    }
}

impl fmt::Display for ReferenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "UNSET"),
            Self::Sent => write!(f, "SENT"),
            Self::Received => write!(f, "RECEIVED"),
        }
    }
}
