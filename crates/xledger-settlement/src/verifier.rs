//! Proof verification seam.
//!
//! The engine never constructs or opens proofs. It hands the origin delta,
//! the leg commitments, and the opaque proof bytes to a [`ProofVerifier`]
//! before folding anything.

use xledger_types::{CommittedLeg, Commitment, ResourceId, Result, XledgerError};

/// Checks the proof attached to a confidential transfer.
pub trait ProofVerifier: Send + Sync {
    fn verify_transfer(
        &self,
        resource: ResourceId,
        origin_delta: &Commitment,
        legs: &[CommittedLeg],
        proof: &[u8],
    ) -> Result<()>;
}

/// Checks what is checkable without secrets: the transfer has legs, and the
/// origin delta cancels the legs exactly, so the transfer itself neither
/// creates nor destroys value. Range proofs are left to a real verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct BalancedDeltaVerifier;

impl ProofVerifier for BalancedDeltaVerifier {
    fn verify_transfer(
        &self,
        _resource: ResourceId,
        origin_delta: &Commitment,
        legs: &[CommittedLeg],
        _proof: &[u8],
    ) -> Result<()> {
        if legs.is_empty() {
            return Err(XledgerError::ProofRejected {
                reason: "transfer has no legs".into(),
            });
        }
        let total: Commitment = legs.iter().map(|l| l.commitment).sum();
        if !(*origin_delta + total).is_identity() {
            return Err(XledgerError::ProofRejected {
                reason: format!(
                    "origin delta {} does not cancel {} leg commitments",
                    origin_delta.short(),
                    legs.len()
                ),
            });
        }
        Ok(())
    }
}

/// Rejects every proof.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingVerifier;

#[cfg(any(test, feature = "test-helpers"))]
impl ProofVerifier for RejectingVerifier {
    fn verify_transfer(
        &self,
        _resource: ResourceId,
        _origin_delta: &Commitment,
        _legs: &[CommittedLeg],
        _proof: &[u8],
    ) -> Result<()> {
        Err(XledgerError::ProofRejected {
            reason: "rejecting verifier".into(),
        })
    }
}
