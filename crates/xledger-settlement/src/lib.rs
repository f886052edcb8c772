//! # xledger-settlement
//!
//! The coordination chain's **Confidential Settlement Engine**.
//!
//! - [`ConfidentialSettlementEngine`]: per-`(chain, asset)` pending and
//!   finalized commitments, merged once per settlement window
//! - [`SupplyConservation`]: checks the finalized commitments of every chain
//!   against minted minus burned, without opening any of them
//! - [`ProofVerifier`]: the black-box seam transfer proofs pass through
//!
//! ## Window lifecycle
//!
//! ```text
//!  transfer / receipt / mint / burn
//!          │
//!          ▼
//!   pending ⊕= delta ──finalize──▶ finalized ⊕= pending, pending = 0
//!                                  window += 1
//! ```

pub mod engine;
pub mod supply_conservation;
pub mod verifier;

pub use engine::{
    ChainCommitment, ConfidentialSettlementEngine, DeltaKind, PendingDelta, SettlementOutcome,
    WindowReport,
};
pub use supply_conservation::SupplyConservation;
pub use verifier::{BalancedDeltaVerifier, ProofVerifier};

#[cfg(any(test, feature = "test-helpers"))]
pub use verifier::RejectingVerifier;
