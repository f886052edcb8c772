//! Relay messages.
//!
//! Everything that crosses a chain boundary is an [`Envelope`]. The relay
//! collaborator observes envelopes in source order and delivers each one at
//! least once; consumers are idempotent on `(reference_id, destination)`.

use serde::{Deserialize, Serialize};

use crate::{
    Callable, ChainId, Commitment, HolderId, ReferenceId, ResourceId, TransferMode, TransferValue,
    XledgerError,
};

/// One outbound transfer leg, as delivered to its destination chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferMessage {
    pub reference_id: ReferenceId,
    pub resource_id: ResourceId,
    pub origin_chain: ChainId,
    pub dest_chain: ChainId,
    /// Sender on the origin chain, re-credited if an atomic leg fails.
    pub sender: HolderId,
    pub holder: HolderId,
    pub value: TransferValue,
    pub callables: Vec<Callable>,
    pub mode: TransferMode,
}

/// Result of applying an atomic leg at its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    Delivered,
    Failed { reason: String },
}

/// Sent from the destination back to the origin for atomic legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicReport {
    pub reference_id: ReferenceId,
    pub resource_id: ResourceId,
    pub origin_chain: ChainId,
    pub dest_chain: ChainId,
    pub outcome: DeliveryOutcome,
}

/// A confidential leg as seen by the coordination chain: a destination and a
/// commitment, never the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedLeg {
    pub dest_chain: ChainId,
    pub commitment: Commitment,
}

/// Messages addressed to the coordination chain's settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinationMessage {
    /// Origin side of a confidential transfer. `origin_delta` is the negated
    /// sum of the leg commitments.
    ConfidentialTransfer {
        reference_id: ReferenceId,
        resource_id: ResourceId,
        origin_chain: ChainId,
        origin_delta: Commitment,
        legs: Vec<CommittedLeg>,
        /// Opaque proof bytes for the external verifier.
        proof: Vec<u8>,
    },
    /// A destination confirms it credited its leg.
    ConfidentialReceipt {
        reference_id: ReferenceId,
        resource_id: ResourceId,
        dest_chain: ChainId,
    },
    /// Public-value mint. The blinding is supplied by the minter.
    Mint {
        reference_id: ReferenceId,
        resource_id: ResourceId,
        chain: ChainId,
        value: u128,
        blinding: crate::Blinding,
    },
    /// Public-value burn.
    Burn {
        reference_id: ReferenceId,
        resource_id: ResourceId,
        chain: ChainId,
        value: u128,
        blinding: crate::Blinding,
    },
}

impl CoordinationMessage {
    #[must_use]
    pub fn reference_id(&self) -> ReferenceId {
        match self {
            Self::ConfidentialTransfer { reference_id, .. }
            | Self::ConfidentialReceipt { reference_id, .. }
            | Self::Mint { reference_id, .. }
            | Self::Burn { reference_id, .. } => *reference_id,
        }
    }

    #[must_use]
    pub fn resource_id(&self) -> ResourceId {
        match self {
            Self::ConfidentialTransfer { resource_id, .. }
            | Self::ConfidentialReceipt { resource_id, .. }
            | Self::Mint { resource_id, .. }
            | Self::Burn { resource_id, .. } => *resource_id,
        }
    }
}

/// What an envelope carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayPayload {
    Transfer(TransferMessage),
    AtomicReport(AtomicReport),
    Coordination(CoordinationMessage),
}

/// The unit the relay ferries between chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub source: ChainId,
    pub destination: ChainId,
    /// Per-source sequence number, in emission order.
    pub sequence: u64,
    pub payload: RelayPayload,
}

impl Envelope {
    /// JSON wire encoding.
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| XledgerError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| XledgerError::Serialization(e.to_string()))
    }
}
